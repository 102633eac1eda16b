use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStatus {
    Unpatched,
    Patched,
    StalePatch,
    Experimental,
}

impl PatchStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unpatched => "NOT PATCHED",
            Self::Patched => "PATCHED",
            Self::StalePatch => "NEW PATCH",
            Self::Experimental => "EXPERIMENTAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Normal,
    BatchSelect,
}

impl SessionMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::BatchSelect,
            Self::BatchSelect => Self::Normal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::BatchSelect => "batch-select",
        }
    }
}

/// One discovered, patch-eligible application bundle. Rebuilt from disk on
/// every discovery pass; only the bundle path carries identity across passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRecord {
    pub name: String,
    pub bundle_path: PathBuf,
    pub status: PatchStatus,
}

/// Order-preserving set of bundle paths chosen for the deferred batch patch.
/// Insertion order is the order bulk actions execute in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    paths: Vec<PathBuf>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the path was already selected; the set never holds
    /// duplicates.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        if self.contains(path.as_path()) {
            return false;
        }
        self.paths.push(path);
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|selected| selected == path)
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }

    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.paths.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub ts_ms: Option<i64>,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            seq: 0,
            level,
            ts_ms: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.buf.back()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Complete interactive-session state. Owned by the command loop and mutated
/// only through `reduce`; never a process global.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub mode: SessionMode,
    /// Selects between the two mutually exclusive batch patch variants.
    /// Only meaningful while `mode` is `BatchSelect`.
    pub gpu_variant: bool,
    pub apps: Vec<AppRecord>,
    pub selection: SelectionSet,
    pub logs: LogBuffer,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            mode: SessionMode::Normal,
            gpu_variant: false,
            apps: Vec::new(),
            selection: SelectionSet::new(),
            logs: LogBuffer::new(2_000),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// What a menu row reports for one application: the on-disk patch status, or
/// the session-local selection overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Disk(PatchStatus),
    Selected,
}

impl RowStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Disk(status) => status.label(),
            Self::Selected => "SELECTED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow {
    /// 1-based position as printed; numeric command tokens refer to it.
    pub index: usize,
    pub name: String,
    pub status: RowStatus,
}

/// Projects the app list for rendering. Disk status and the selection overlay
/// are separate fields in state; they are combined here, at render time, and
/// the overlay only applies while batch-select mode is active.
pub fn menu_rows(state: &SessionState) -> Vec<MenuRow> {
    state
        .apps
        .iter()
        .enumerate()
        .map(|(idx, app)| {
            let selected = state.mode == SessionMode::BatchSelect
                && state.selection.contains(app.bundle_path.as_path());
            MenuRow {
                index: idx + 1,
                name: app.name.clone(),
                status: if selected {
                    RowStatus::Selected
                } else {
                    RowStatus::Disk(app.status)
                },
            }
        })
        .collect()
}
