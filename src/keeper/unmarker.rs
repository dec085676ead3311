use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use snafu::ResultExt;
use tracing::{debug, info, warn};

use super::probe::{DirectoryState, marker_path};
use super::report::{DeleteSnafu, MarkerAction, MarkerError, PassOutcome};
use super::MARKER_FILE_NAME;

/// Deletes the marker from every candidate directory that holds one but has
/// gained real content.
pub struct FilledDirectoryUnmarker;

impl FilledDirectoryUnmarker {
    pub fn unmark<P: AsRef<Path>>(candidates: &[P]) -> PassOutcome {
        let mut outcome = PassOutcome::default();

        for candidate in candidates {
            let dir = candidate.as_ref();
            match Self::try_unmark(dir) {
                Ok(true) => {
                    info!(
                        action = %MarkerAction::Delete,
                        marker = MARKER_FILE_NAME,
                        path = %dir.display(),
                        "Deleted marker"
                    );
                    outcome.changed.push(dir.to_path_buf());
                }
                Ok(false) => {}
                Err(error) => {
                    warn!("{error}");
                    outcome.failures.push(error);
                }
            }
        }

        outcome
    }

    fn try_unmark(dir: &Path) -> Result<bool, MarkerError> {
        let marker = marker_path(dir);
        if !marker.is_file() {
            return Ok(false);
        }

        let Some(state) = DirectoryState::probe(dir)? else {
            return Ok(false);
        };

        if state.is_empty_for_unmarking() {
            return Ok(false);
        }

        match fs::remove_file(&marker) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Marker in {} vanished before deletion", dir.display());
                Ok(false)
            }
            Err(e) => Err(e).context(DeleteSnafu { path: dir }),
        }
    }
}
