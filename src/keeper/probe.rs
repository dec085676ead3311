use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use snafu::ResultExt;
use tracing::debug;

use super::MARKER_FILE_NAME;
use super::report::{ListSnafu, MarkerError};

/// Snapshot of a directory's direct children, taken at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryState {
    pub subdirectories: usize,
    /// Every non-directory entry, the marker included
    pub files: usize,
    pub has_marker: bool,
}

impl DirectoryState {
    /// Inspects `dir`. Returns `Ok(None)` when the candidate is not an existing
    /// directory, including when it vanishes while being listed.
    pub fn probe(dir: &Path) -> Result<Option<Self>, MarkerError> {
        if !dir.is_dir() {
            debug!("Skipping {}: not an existing directory", dir.display());
            return Ok(None);
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Skipping {}: vanished before listing", dir.display());
                return Ok(None);
            }
            Err(e) => return Err(e).context(ListSnafu { path: dir }),
        };

        let mut state = DirectoryState {
            subdirectories: 0,
            files: 0,
            has_marker: marker_path(dir).is_file(),
        };

        for entry in entries {
            let entry = entry.context(ListSnafu { path: dir })?;
            let file_type = entry.file_type().context(ListSnafu { path: dir })?;
            if file_type.is_dir() {
                state.subdirectories += 1;
            } else {
                state.files += 1;
            }
        }

        Ok(Some(state))
    }

    /// Emptiness as seen before creating a marker: raw counts.
    pub fn is_empty_for_marking(&self) -> bool {
        self.subdirectories == 0 && self.files == 0
    }

    /// Emptiness as seen before deleting a marker: exactly one file, the
    /// marker itself, is discounted.
    pub fn is_empty_for_unmarking(&self) -> bool {
        let has_subdirectory = self.subdirectories > 0;
        let has_other_file = self.files > 1;
        !has_subdirectory && !has_other_file
    }
}

pub fn marker_path(dir: &Path) -> PathBuf {
    dir.join(MARKER_FILE_NAME)
}
