use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hashlink::LinkedHashSet;
use snafu::ResultExt;
use tracing::{debug, info, warn};

use super::probe::{DirectoryState, marker_path};
use super::report::{CreateSnafu, MarkerAction, MarkerError, PassOutcome};
use super::MARKER_FILE_NAME;
use crate::ext::LexicalPathExt;

/// Creates the marker in every candidate directory that is empty and
/// unmarked. Does not recurse.
pub struct EmptyDirectoryMarker;

impl EmptyDirectoryMarker {
    pub fn mark<P: AsRef<Path>>(candidates: &[P]) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        for candidate in candidates {
            Self::mark_one(candidate.as_ref(), &mut outcome);
        }
        outcome
    }

    /// Same as [`Self::mark`], additionally returning the distinct lexical
    /// parents of every candidate in first-seen order, whether or not the
    /// candidate exists.
    pub fn mark_with_parents<P: AsRef<Path>>(candidates: &[P]) -> (PassOutcome, Vec<PathBuf>) {
        let mut outcome = PassOutcome::default();
        let mut parents = LinkedHashSet::new();

        for candidate in candidates {
            let candidate = candidate.as_ref();
            if let Some(parent) = candidate.lexical_parent() {
                parents.insert(parent);
            }
            Self::mark_one(candidate, &mut outcome);
        }

        (outcome, parents.into_iter().collect())
    }

    fn mark_one(dir: &Path, outcome: &mut PassOutcome) {
        match Self::try_mark(dir) {
            Ok(true) => {
                info!(
                    action = %MarkerAction::Create,
                    marker = MARKER_FILE_NAME,
                    path = %dir.display(),
                    "Created marker"
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

    fn try_mark(dir: &Path) -> Result<bool, MarkerError> {
        let Some(state) = DirectoryState::probe(dir)? else {
            return Ok(false);
        };

        if state.has_marker || !state.is_empty_for_marking() {
            return Ok(false);
        }

        // create_new: a marker that appeared since probing is left untouched
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(marker_path(dir))
        {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Marker in {} appeared concurrently", dir.display());
                Ok(false)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Skipping {}: vanished before marking", dir.display());
                Ok(false)
            }
            Err(e) => Err(e).context(CreateSnafu { path: dir }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn marks_empty_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let foo = temp_dir.path().join("Foo");
        fs::create_dir(&foo).expect("Failed to create dir");

        let outcome = EmptyDirectoryMarker::mark(&[&foo]);

        assert_eq!(outcome.changed, vec![foo.clone()]);
        assert!(outcome.failures.is_empty());
        let metadata = fs::metadata(foo.join(".gitkeep")).expect("Marker should exist");
        assert_eq!(metadata.len(), 0);
    }

    #[test]
    fn skips_nonexistent_candidate_without_writing() {
        let outcome = EmptyDirectoryMarker::mark(&["/nonexistent/path"]);

        assert!(outcome.changed.is_empty());
        assert!(outcome.failures.is_empty());
        assert!(!Path::new("/nonexistent/path/.gitkeep").exists());
    }

    #[test]
    fn skips_non_empty_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("bar.txt"), "bar").expect("Failed to write file");

        let outcome = EmptyDirectoryMarker::mark(&[temp_dir.path()]);

        assert!(outcome.changed.is_empty());
        assert!(!temp_dir.path().join(".gitkeep").exists());
    }

    #[test]
    fn skips_directory_with_only_subdirectory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("child")).expect("Failed to create dir");

        let outcome = EmptyDirectoryMarker::mark(&[temp_dir.path()]);

        assert!(outcome.changed.is_empty());
    }

    #[test]
    fn marking_twice_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let first = EmptyDirectoryMarker::mark(&[temp_dir.path()]);
        let second = EmptyDirectoryMarker::mark(&[temp_dir.path()]);

        assert_eq!(first.changed.len(), 1);
        assert!(second.changed.is_empty());
        assert!(second.failures.is_empty());
    }

    #[test]
    fn does_not_recurse_into_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).expect("Failed to create dirs");

        let outcome = EmptyDirectoryMarker::mark(&[temp_dir.path()]);

        assert!(outcome.changed.is_empty());
        assert!(!nested.join(".gitkeep").exists());
    }

    #[test]
    fn mark_with_parents_dedups_in_first_seen_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let a = temp_dir.path().join("A");
        let b = temp_dir.path().join("B");
        fs::create_dir(&a).expect("Failed to create dir");

        let candidates = vec![a.join("x"), b.join("y"), a.join("z"), a.clone()];
        let (outcome, parents) = EmptyDirectoryMarker::mark_with_parents(&candidates);

        // Parents are computed lexically, so B is included even though it does not exist
        assert_eq!(parents, vec![a.clone(), b, temp_dir.path().to_path_buf()]);
        assert_eq!(outcome.changed, vec![a]);
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn failure_on_one_candidate_does_not_stop_the_rest() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let locked = temp_dir.path().join("locked");
        let open = temp_dir.path().join("open");
        fs::create_dir(&locked).expect("Failed to create dir");
        fs::create_dir(&open).expect("Failed to create dir");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555))
            .expect("Failed to set permissions");

        // Root ignores permission bits, nothing to observe there
        let canary = locked.join("canary");
        if fs::write(&canary, "").is_ok() {
            let _ = fs::remove_file(&canary);
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
                .expect("Failed to restore permissions");
            return;
        }

        let outcome = EmptyDirectoryMarker::mark(&[&locked, &open]);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
            .expect("Failed to restore permissions");
        assert_eq!(outcome.changed, vec![open.clone()]);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            &outcome.failures[0],
            MarkerError::CreateError { path, .. } if path == &locked
        ));
    }
}
