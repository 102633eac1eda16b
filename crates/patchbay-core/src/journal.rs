use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalOutcome {
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEvent {
    SessionStarted {
        version: String,
    },
    AppPatched {
        name: String,
        bundle_path: String,
        outcome: JournalOutcome,
        detail: Option<String>,
    },
    BatchPatchApplied {
        count: usize,
        gpu_variant: bool,
    },
    BatchPatchRemoved {
        count: usize,
    },
    DaemonApplied {
        preset: String,
        outcome: JournalOutcome,
        detail: Option<String>,
    },
    DaemonRemoved {
        outcome: JournalOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub seq: u64,
    pub ts_ms: i64,
    #[serde(flatten)]
    pub event: JournalEvent,
}

/// Append-only JSONL journal of operator actions that touched the host.
/// Purely observational: journal failures never block an operation.
#[derive(Debug)]
pub struct JournalStore {
    path: PathBuf,
    next_seq: u64,
}

impl JournalStore {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let existing = load_records(path.as_path())?;
        let next_seq = existing
            .iter()
            .map(|record| record.seq)
            .max()
            .map_or(1, |seq| seq.saturating_add(1));
        Ok(Self { path, next_seq })
    }

    pub fn append(&mut self, event: JournalEvent) -> std::io::Result<u64> {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        let record = JournalRecord {
            seq,
            ts_ms: chrono::Utc::now().timestamp_millis(),
            event,
        };
        let line = serde_json::to_string(&record)
            .map_err(|err| std::io::Error::other(format!("serialize: {err}")))?;
        append_line(self.path.as_path(), line.as_str())?;
        Ok(seq)
    }

    pub fn load(&self) -> std::io::Result<Vec<JournalRecord>> {
        load_records(self.path.as_path())
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

fn load_records(path: &Path) -> std::io::Result<Vec<JournalRecord>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // A torn tail write only loses that record, not the journal.
        if let Ok(record) = serde_json::from_str::<JournalRecord>(line.as_str()) {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sequences_resume_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("journal.jsonl");

        let mut store = JournalStore::open(path.as_path()).expect("open");
        let first = store
            .append(JournalEvent::SessionStarted {
                version: "0.1.0".to_string(),
            })
            .expect("append");
        assert_eq!(first, 1);

        let mut reopened = JournalStore::open(path.as_path()).expect("reopen");
        let second = reopened
            .append(JournalEvent::DaemonRemoved {
                outcome: JournalOutcome::Succeeded,
            })
            .expect("append");
        assert_eq!(second, 2);

        let records = reopened.load().expect("load");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].seq, 1);
        assert_eq!(records[1].seq, 2);
    }

    #[test]
    fn events_round_trip_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("journal.jsonl");
        let event = JournalEvent::AppPatched {
            name: "Alpha".to_string(),
            bundle_path: "/Applications/Alpha.app".to_string(),
            outcome: JournalOutcome::Failed,
            detail: Some("marker write denied".to_string()),
        };

        let mut store = JournalStore::open(path.as_path()).expect("open");
        store.append(event.clone()).expect("append");

        let records = store.load().expect("load");
        assert_eq!(records[0].event, event);
        assert!(records[0].ts_ms > 0);
    }

    #[test]
    fn torn_lines_are_dropped_on_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("journal.jsonl");

        let mut store = JournalStore::open(path.as_path()).expect("open");
        store
            .append(JournalEvent::BatchPatchApplied {
                count: 2,
                gpu_variant: false,
            })
            .expect("append");
        std::fs::OpenOptions::new()
            .append(true)
            .open(path.as_path())
            .and_then(|mut file| writeln!(file, "{{\"seq\":2,\"ts_ms\""))
            .expect("write torn line");

        let records = store.load().expect("load");
        assert_eq!(records.len(), 1);
    }
}
