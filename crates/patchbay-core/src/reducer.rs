use super::actions::RuntimeAction;
use super::actions::SessionAction;
use super::actions::SessionEffect;
use super::actions::UserCommand;
use super::state::SessionMode;
use super::state::SessionState;

/// Applies one action to the session. State transitions happen in place;
/// side effects are returned for the shell to execute. Commands arriving
/// with a stale or wrong-mode precondition fall through to no effects —
/// never to the other mode's behavior.
pub fn reduce(state: &mut SessionState, action: SessionAction) -> Vec<SessionEffect> {
    match action {
        SessionAction::User(command) => reduce_user(state, command),
        SessionAction::Runtime(runtime) => {
            reduce_runtime(state, runtime);
            Vec::new()
        }
    }
}

fn reduce_user(state: &mut SessionState, command: UserCommand) -> Vec<SessionEffect> {
    match command {
        UserCommand::Quit => vec![SessionEffect::Quit],
        UserCommand::ToggleMode => {
            state.mode = state.mode.toggled();
            Vec::new()
        }
        UserCommand::ToggleVariant => {
            if state.mode == SessionMode::BatchSelect {
                state.gpu_variant = !state.gpu_variant;
            }
            Vec::new()
        }
        UserCommand::PatchAll => {
            if state.mode != SessionMode::Normal || state.apps.is_empty() {
                return Vec::new();
            }
            vec![SessionEffect::PatchAll {
                targets: state.apps.clone(),
            }]
        }
        UserCommand::PatchSelected => {
            if state.mode != SessionMode::BatchSelect || state.selection.is_empty() {
                return Vec::new();
            }
            vec![
                SessionEffect::ApplyBatchPatch {
                    targets: state.selection.snapshot(),
                    gpu_variant: state.gpu_variant,
                },
                SessionEffect::SpawnFinisher,
            ]
        }
        UserCommand::RemoveBatchPatch => {
            if state.mode != SessionMode::BatchSelect {
                return Vec::new();
            }
            let targets = state
                .apps
                .iter()
                .map(|app| app.bundle_path.clone())
                .collect();
            state.selection.clear();
            vec![SessionEffect::RemoveBatchPatch { targets }]
        }
        UserCommand::PresetMenu => vec![SessionEffect::OpenPresetMenu],
        UserCommand::Select(index) => {
            let Some(app) = state.apps.get(index) else {
                return Vec::new();
            };
            match state.mode {
                SessionMode::Normal => vec![SessionEffect::PatchApp {
                    name: app.name.clone(),
                    bundle_path: app.bundle_path.clone(),
                }],
                SessionMode::BatchSelect => {
                    let path = app.bundle_path.clone();
                    state.selection.insert(path);
                    Vec::new()
                }
            }
        }
        UserCommand::Noop => Vec::new(),
    }
}

fn reduce_runtime(state: &mut SessionState, action: RuntimeAction) {
    match action {
        RuntimeAction::SetApps(apps) => {
            state.apps = apps;
        }
        RuntimeAction::AppendLog(entry) => {
            state.logs.append(entry);
        }
        RuntimeAction::ClearSelection => {
            state.selection.clear();
        }
        RuntimeAction::ClearLogs => {
            state.logs.clear();
        }
    }
}

#[cfg(test)]
mod tests;
