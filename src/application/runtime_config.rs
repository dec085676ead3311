use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{ApplyArgs, Cli, Command};
use crate::keeper::ChangeBatch;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub refresh: Option<String>,
    pub mode: RunMode,
}

#[derive(Debug, Clone)]
pub enum RunMode {
    Apply(ChangeBatch),
    Watch { debounce: Option<Duration> },
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let mode = match cli.command {
            Command::Apply(args) => RunMode::Apply(batch_from_args(&cli.root, args)),
            Command::Watch(args) => RunMode::Watch {
                debounce: args.debounce_ms.map(Duration::from_millis),
            },
        };

        Self {
            root: cli.root,
            refresh: cli.refresh,
            mode,
        }
    }
}

/// Relative paths are taken relative to the project root.
fn batch_from_args(root: &Path, args: ApplyArgs) -> ChangeBatch {
    let resolve = |paths: Vec<PathBuf>| paths.into_iter().map(|path| root.join(path));

    ChangeBatch::new()
        .with_imported(resolve(args.imported))
        .with_deleted(resolve(args.deleted))
        .with_moved(resolve(args.moved))
        .with_moved_from(resolve(args.moved_from))
}
