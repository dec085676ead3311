use std::path::{Component, Path, PathBuf};

/// Makes `path` absolute against the current directory without touching the
/// filesystem. Symlinks are not resolved.
fn lexical_absolute(path: &Path) -> PathBuf {
    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(current_dir) => current_dir.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    normalize_path(&absolute_path)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a prefix
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

pub trait LexicalPathExt {
    fn lexical_absolute(&self) -> PathBuf;

    /// Parent directory computed from the path text alone. `None` for a
    /// filesystem root.
    fn lexical_parent(&self) -> Option<PathBuf>;

    /// Whether any component of the path equals one of `names`.
    fn has_component_in(&self, names: &[String]) -> bool;
}

impl LexicalPathExt for Path {
    fn lexical_absolute(&self) -> PathBuf {
        lexical_absolute(self)
    }

    fn lexical_parent(&self) -> Option<PathBuf> {
        lexical_absolute(self).parent().map(Path::to_path_buf)
    }

    fn has_component_in(&self, names: &[String]) -> bool {
        self.components().any(|component| match component {
            Component::Normal(name) => names.iter().any(|n| name == n.as_str()),
            _ => false,
        })
    }
}

impl LexicalPathExt for PathBuf {
    fn lexical_absolute(&self) -> PathBuf {
        self.as_path().lexical_absolute()
    }

    fn lexical_parent(&self) -> Option<PathBuf> {
        self.as_path().lexical_parent()
    }

    fn has_component_in(&self, names: &[String]) -> bool {
        self.as_path().has_component_in(names)
    }
}
