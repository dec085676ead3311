use std::path::{Path, PathBuf};

use hashlink::LinkedHashSet;
use tracing::debug;

use crate::ext::LexicalPathExt;

/// Derives the distinct parent directories of a set of changed paths.
pub struct ParentCollector;

impl ParentCollector {
    /// Lexical parents that exist as directories right now, deduplicated in
    /// first-seen order. Parentless paths are skipped.
    pub fn parents<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
        let mut parents = LinkedHashSet::new();

        for path in paths {
            let path = path.as_ref();
            let Some(parent) = path.lexical_parent() else {
                debug!("Skipping {}: no parent directory", path.display());
                continue;
            };

            if parents.contains(&parent) {
                continue;
            }
            if parent.is_dir() {
                parents.insert(parent);
            } else {
                debug!("Skipping parent {}: not an existing directory", parent.display());
            }
        }

        parents.into_iter().collect()
    }
}
