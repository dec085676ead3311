use std::path::PathBuf;

use hashlink::LinkedHashSet;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};
use tracing::debug;

use crate::ext::LexicalPathExt;
use crate::keeper::{ChangeBatch, MARKER_FILE_NAME};

/// Accumulates native filesystem events into a single change batch.
///
/// Each category is deduplicated in first-seen order. Paths naming the marker
/// itself are dropped so the keeper's own writes never feed back.
#[derive(Debug, Default)]
pub struct BatchCollector {
    exclude: Vec<String>,
    imported: LinkedHashSet<PathBuf>,
    deleted: LinkedHashSet<PathBuf>,
    moved: LinkedHashSet<PathBuf>,
    moved_from: LinkedHashSet<PathBuf>,
}

impl BatchCollector {
    pub fn new(exclude: Vec<String>) -> Self {
        Self {
            exclude,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.imported.is_empty()
            && self.deleted.is_empty()
            && self.moved.is_empty()
            && self.moved_from.is_empty()
    }

    pub fn push(&mut self, event: Event) {
        let Event { kind, paths, .. } = event;
        match kind {
            EventKind::Create(_) => self.insert_all(Category::Imported, paths),
            EventKind::Remove(_) => self.insert_all(Category::Deleted, paths),
            EventKind::Modify(ModifyKind::Name(mode)) => self.push_rename(mode, paths),
            other => debug!("Ignoring {:?} event for {:?}", other, paths),
        }
    }

    /// Drains everything collected so far into a batch.
    pub fn take(&mut self) -> ChangeBatch {
        ChangeBatch {
            imported: std::mem::take(&mut self.imported).into_iter().collect(),
            deleted: std::mem::take(&mut self.deleted).into_iter().collect(),
            moved: std::mem::take(&mut self.moved).into_iter().collect(),
            moved_from: std::mem::take(&mut self.moved_from).into_iter().collect(),
        }
    }

    fn push_rename(&mut self, mode: RenameMode, paths: Vec<PathBuf>) {
        match mode {
            RenameMode::From => self.insert_all(Category::MovedFrom, paths),
            RenameMode::To => self.insert_all(Category::Moved, paths),
            RenameMode::Both => {
                let mut paths = paths.into_iter();
                if let Some(from) = paths.next() {
                    self.insert(Category::MovedFrom, from);
                }
                self.insert_all(Category::Moved, paths);
            }
            // Backends that cannot tell the two ends apart
            RenameMode::Any | RenameMode::Other => {
                for path in paths {
                    if path.exists() {
                        self.insert(Category::Imported, path);
                    } else {
                        self.insert(Category::Deleted, path);
                    }
                }
            }
        }
    }

    fn insert_all(&mut self, category: Category, paths: impl IntoIterator<Item = PathBuf>) {
        for path in paths {
            self.insert(category, path);
        }
    }

    fn insert(&mut self, category: Category, path: PathBuf) {
        if path.file_name().is_some_and(|name| name == MARKER_FILE_NAME) {
            return;
        }
        if path.has_component_in(&self.exclude) {
            debug!("Ignoring excluded path {}", path.display());
            return;
        }

        let set = match category {
            Category::Imported => &mut self.imported,
            Category::Deleted => &mut self.deleted,
            Category::Moved => &mut self.moved,
            Category::MovedFrom => &mut self.moved_from,
        };
        set.insert(path);
    }
}

#[derive(Debug, Clone, Copy)]
enum Category {
    Imported,
    Deleted,
    Moved,
    MovedFrom,
}
