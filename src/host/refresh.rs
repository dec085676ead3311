use std::path::PathBuf;

use compio::process::Command;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use crate::keeper::RefreshHook;

/// Refresh hook chosen from the project config.
#[derive(Debug, Clone)]
pub enum HostRefresh {
    Shell(ShellRefresh),
    Disabled,
}

impl HostRefresh {
    pub fn from_command(command: Option<String>, root: PathBuf) -> Self {
        match command {
            Some(command) => HostRefresh::Shell(ShellRefresh { command, root }),
            None => HostRefresh::Disabled,
        }
    }
}

impl RefreshHook for HostRefresh {
    async fn refresh(&self) {
        match self {
            HostRefresh::Shell(shell) => {
                if let Err(error) = shell.run().await {
                    warn!("Refresh failed: {error}");
                }
            }
            HostRefresh::Disabled => debug!("No refresh command configured"),
        }
    }
}

/// Runs a shell command from the project root.
#[derive(Debug, Clone)]
pub struct ShellRefresh {
    command: String,
    root: PathBuf,
}

impl ShellRefresh {
    pub async fn run(&self) -> Result<(), RefreshError> {
        let mut cmd = self.create_command();

        let mut handle = cmd.spawn().context(SpawnSnafu {
            command: self.command.clone(),
        })?;

        let status = handle.wait().await.context(WaitSnafu {
            command: self.command.clone(),
        })?;

        if status.success() {
            info!("Refresh command '{}' completed", self.command);
            Ok(())
        } else {
            Err(RefreshError::UnsuccessfulExecution {
                command: self.command.clone(),
                status: status.code().unwrap_or(-1),
            })
        }
    }

    /// Shell program and arguments for the current platform.
    fn full_command(&self) -> (&'static str, Vec<&str>) {
        #[cfg(target_family = "windows")]
        {
            ("cmd", vec!["/C", &self.command])
        }
        #[cfg(target_family = "unix")]
        {
            ("sh", vec!["-c", &self.command])
        }
    }

    fn create_command(&self) -> Command {
        let (program, args) = self.full_command();
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.current_dir(&self.root);
        cmd
    }
}

#[derive(Debug, Snafu)]
pub enum RefreshError {
    #[snafu(display("Failed to spawn refresh command '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for refresh command '{}'", command))]
    WaitError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Refresh command '{}' failed with exit code {}", command, status))]
    UnsuccessfulExecution { command: String, status: i32 },
}
