use std::path::PathBuf;

use super::state::AppRecord;
use super::state::LogEntry;

#[derive(Debug, Clone)]
pub enum SessionAction {
    User(UserCommand),
    Runtime(RuntimeAction),
}

/// A fully resolved operator command. Produced by the token parser; the same
/// input token can resolve to different commands depending on the session
/// mode, and tokens whose mode precondition fails resolve to `Noop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Quit,
    ToggleMode,
    ToggleVariant,
    PatchAll,
    PatchSelected,
    RemoveBatchPatch,
    PresetMenu,
    /// Zero-based index into the discovered app list.
    Select(usize),
    Noop,
}

/// Results flowing back into the session after the shell executed an effect.
#[derive(Debug, Clone)]
pub enum RuntimeAction {
    SetApps(Vec<AppRecord>),
    AppendLog(LogEntry),
    ClearSelection,
    ClearLogs,
}

/// Choice made inside the power-preset sub-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetChoice {
    Apply(&'static str),
    Remove,
    Back,
}

/// Side effects the reducer asks the shell to perform. The shell executes
/// them in order, one at a time, and feeds outcomes back as `Runtime`
/// actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    Quit,
    PatchApp {
        name: String,
        bundle_path: PathBuf,
    },
    PatchAll {
        targets: Vec<AppRecord>,
    },
    ApplyBatchPatch {
        targets: Vec<PathBuf>,
        gpu_variant: bool,
    },
    /// Spawn the detached relaunch finisher. Fire-and-forget: the child is
    /// never joined and its exit is never observed.
    SpawnFinisher,
    RemoveBatchPatch {
        targets: Vec<PathBuf>,
    },
    OpenPresetMenu,
}
