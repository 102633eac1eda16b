use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
    Skipped,
}

impl OutcomeStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Result of one per-application action. Failures are data, not errors: a
/// failed item is reported and never stops the sibling items in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOutcome {
    pub app: String,
    pub bundle_path: String,
    pub status: OutcomeStatus,
    pub detail: Option<String>,
}

impl PatchOutcome {
    pub fn succeeded(bundle: &Path) -> Self {
        Self::build(bundle, OutcomeStatus::Succeeded, None)
    }

    pub fn failed(bundle: &Path, detail: impl Into<String>) -> Self {
        Self::build(bundle, OutcomeStatus::Failed, Some(detail.into()))
    }

    pub fn skipped(bundle: &Path, detail: impl Into<String>) -> Self {
        Self::build(bundle, OutcomeStatus::Skipped, Some(detail.into()))
    }

    fn build(bundle: &Path, status: OutcomeStatus, detail: Option<String>) -> Self {
        let app = bundle
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            app,
            bundle_path: bundle.to_string_lossy().into_owned(),
            status,
            detail,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<PatchOutcome>,
}

impl BatchReport {
    pub fn push(&mut self, outcome: PatchOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn succeeded_count(&self) -> usize {
        self.count(OutcomeStatus::Succeeded)
    }

    pub fn failed_count(&self) -> usize {
        self.count(OutcomeStatus::Failed)
    }

    fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaemonOperation {
    Install,
    Remove,
}

impl DaemonOperation {
    pub fn label(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Remove => "remove",
        }
    }
}

/// Result of one daemon lifecycle operation. A failed install may leave the
/// host partially installed; callers re-probe `enabled()` instead of
/// trusting their last known state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonReport {
    pub operation: DaemonOperation,
    pub preset: Option<String>,
    pub status: OutcomeStatus,
    pub detail: Option<String>,
}

impl DaemonReport {
    pub fn succeeded(operation: DaemonOperation, preset: Option<&str>) -> Self {
        Self {
            operation,
            preset: preset.map(str::to_string),
            status: OutcomeStatus::Succeeded,
            detail: None,
        }
    }

    pub fn failed(
        operation: DaemonOperation,
        preset: Option<&str>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            preset: preset.map(str::to_string),
            status: OutcomeStatus::Failed,
            detail: Some(detail.into()),
        }
    }
}
