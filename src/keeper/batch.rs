use std::path::PathBuf;

/// One atomic delivery of changed paths from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    pub imported: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    /// Destinations of moves
    pub moved: Vec<PathBuf>,
    /// Sources of moves
    pub moved_from: Vec<PathBuf>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_imported(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.imported.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_deleted(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.deleted.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_moved(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.moved.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_moved_from(
        mut self,
        paths: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.moved_from.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.imported.is_empty()
            && self.deleted.is_empty()
            && self.moved.is_empty()
            && self.moved_from.is_empty()
    }

    pub fn len(&self) -> usize {
        self.imported.len() + self.deleted.len() + self.moved.len() + self.moved_from.len()
    }

    /// Keeps only the paths for which `keep` returns true, in every category.
    pub fn retain(&mut self, mut keep: impl FnMut(&PathBuf) -> bool) {
        self.imported.retain(&mut keep);
        self.deleted.retain(&mut keep);
        self.moved.retain(&mut keep);
        self.moved_from.retain(&mut keep);
    }
}
