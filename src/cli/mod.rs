mod cli;

pub use cli::{ApplyArgs, Cli, Command};
