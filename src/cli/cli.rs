use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::application::data::LogLevel;

/// Keeps a .gitkeep marker in every empty directory of a project tree.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// The root directory of the project
    #[clap(long, short, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Shell command run after every batch, overriding the config file
    #[clap(long, global = true)]
    pub refresh: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Reconcile markers for a single batch of changed paths
    Apply(ApplyArgs),
    /// Watch the project root and reconcile markers as changes happen
    Watch(WatchArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ApplyArgs {
    /// Paths that were created or imported
    #[clap(long, value_name = "PATH")]
    pub imported: Vec<PathBuf>,
    /// Paths that were deleted
    #[clap(long, value_name = "PATH")]
    pub deleted: Vec<PathBuf>,
    /// Destination paths of moves
    #[clap(long, value_name = "PATH")]
    pub moved: Vec<PathBuf>,
    /// Source paths of moves
    #[clap(long, value_name = "PATH")]
    pub moved_from: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Quiet period in milliseconds that closes a batch, overriding the config file
    #[clap(long)]
    pub debounce_ms: Option<u64>,
}
