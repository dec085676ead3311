use std::path::PathBuf;

use derive_more::Display;
use snafu::Snafu;

use super::MARKER_FILE_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MarkerAction {
    #[display("Create")]
    Create,
    #[display("Delete")]
    Delete,
}

/// One marker creation or deletion, as reported to the logging sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerEvent {
    pub action: MarkerAction,
    pub marker_name: &'static str,
    pub path: PathBuf,
}

impl MarkerEvent {
    pub fn new(action: MarkerAction, path: PathBuf) -> Self {
        Self {
            action,
            marker_name: MARKER_FILE_NAME,
            path,
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum MarkerError {
    #[snafu(display("Failed to list directory {}", path.display()))]
    ListError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to create {} in {}", MARKER_FILE_NAME, path.display()))]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to delete {} in {}", MARKER_FILE_NAME, path.display()))]
    DeleteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of a single mark or unmark pass over a set of candidates.
#[derive(Debug, Default)]
pub struct PassOutcome {
    /// Directories whose marker was actually created or deleted
    pub changed: Vec<PathBuf>,
    pub failures: Vec<MarkerError>,
}

/// Everything a reconciliation did for one change batch, in execution order.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub events: Vec<MarkerEvent>,
    pub failures: Vec<MarkerError>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.events.is_empty() && self.failures.is_empty()
    }

    pub fn created(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths_for(MarkerAction::Create)
    }

    pub fn deleted(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths_for(MarkerAction::Delete)
    }

    pub(super) fn absorb(&mut self, action: MarkerAction, outcome: PassOutcome) {
        self.events.extend(
            outcome
                .changed
                .into_iter()
                .map(|path| MarkerEvent::new(action, path)),
        );
        self.failures.extend(outcome.failures);
    }

    fn paths_for(&self, action: MarkerAction) -> impl Iterator<Item = &PathBuf> {
        self.events
            .iter()
            .filter(move |event| event.action == action)
            .map(|event| &event.path)
    }
}
