use std::path::PathBuf;

use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::{RunMode, RuntimeConfig};
use crate::config::{KeeperConfig, KeeperConfigError};
use crate::ext::LexicalPathExt;
use crate::host::{HostRefresh, TreeWatcher, WatchError, print_report};
use crate::keeper::{ChangeBatch, MarkerReconciler};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        ensure!(
            app_config.root.is_dir(),
            RootNotDirectorySnafu {
                root: app_config.root.clone()
            }
        );

        let config = KeeperConfig::read(&app_config.root)
            .await
            .context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", config);

        let refresh =
            HostRefresh::from_command(app_config.refresh.or(config.refresh), app_config.root.clone());

        match app_config.mode {
            RunMode::Apply(batch) => Self::apply(batch, &config.exclude, &refresh).await,
            RunMode::Watch { debounce } => {
                TreeWatcher::new(
                    app_config.root,
                    debounce.unwrap_or(config.debounce),
                    config.exclude,
                    refresh,
                )
                .run()
                .await
                .context(WatchSnafu)
            }
        }
    }

    async fn apply(
        mut batch: ChangeBatch,
        exclude: &[String],
        refresh: &HostRefresh,
    ) -> Result<(), ApplicationError> {
        batch.retain(|path| !path.has_component_in(exclude));
        if batch.is_empty() {
            debug!("Nothing to reconcile, refreshing only");
        } else {
            info!("Applying batch of {} paths", batch.len());
        }

        let report = MarkerReconciler::on_batch(&batch, refresh).await;
        print_report(&report);
        info!(
            "Batch reconciled: {} created, {} deleted, {} failed",
            report.created().count(),
            report.deleted().count(),
            report.failures.len()
        );

        ensure!(
            report.failures.is_empty(),
            IncompleteReconciliationSnafu {
                failed: report.failures.len()
            }
        );
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Project root {} is not a directory", root.display()))]
    RootNotDirectory { root: PathBuf },
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: KeeperConfigError },
    #[snafu(display("Critical failure encountered while watching the project"))]
    WatchError { source: WatchError },
    #[snafu(display("{} marker operation(s) failed", failed))]
    IncompleteReconciliation { failed: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn apply_config(root: PathBuf, batch: ChangeBatch) -> RuntimeConfig {
        RuntimeConfig {
            root,
            refresh: None,
            mode: RunMode::Apply(batch),
        }
    }

    #[compio::test]
    async fn apply_marks_imported_empty_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let foo = temp_dir.path().join("Assets").join("Foo");
        fs::create_dir_all(&foo).expect("Failed to create dir");

        Application::run(apply_config(
            temp_dir.path().to_path_buf(),
            ChangeBatch::new().with_imported([&foo]),
        ))
        .await
        .expect("Apply should succeed");

        assert!(foo.join(".gitkeep").is_file());
    }

    #[compio::test]
    async fn apply_skips_excluded_paths() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let tags = temp_dir.path().join(".git").join("refs").join("tags");
        fs::create_dir_all(&tags).expect("Failed to create dir");

        Application::run(apply_config(
            temp_dir.path().to_path_buf(),
            ChangeBatch::new().with_imported([&tags]),
        ))
        .await
        .expect("Apply should succeed");

        assert!(!tags.join(".gitkeep").exists());
    }

    #[cfg(target_family = "unix")]
    #[compio::test]
    async fn apply_runs_refresh_from_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(
            temp_dir.path().join("gitkeeper.yaml"),
            "refresh: \"touch refreshed\"\n",
        )
        .expect("Failed to write config");

        Application::run(apply_config(temp_dir.path().to_path_buf(), ChangeBatch::new()))
            .await
            .expect("Apply should succeed");

        assert!(temp_dir.path().join("refreshed").exists());
    }

    #[cfg(target_family = "unix")]
    #[compio::test]
    async fn apply_reports_failures_after_finishing_batch_and_refresh() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let locked = temp_dir.path().join("Assets").join("Locked");
        let open = temp_dir.path().join("Assets").join("Open");
        fs::create_dir_all(&locked).expect("Failed to create dir");
        fs::create_dir_all(&open).expect("Failed to create dir");
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

        let result = Application::run(RuntimeConfig {
            root: temp_dir.path().to_path_buf(),
            refresh: Some("touch refreshed".to_string()),
            mode: RunMode::Apply(ChangeBatch::new().with_imported([&locked, &open])),
        })
        .await;

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))
            .expect("Failed to restore permissions");
        assert!(matches!(
            result,
            Err(ApplicationError::IncompleteReconciliation { failed: 1 })
        ));
        assert!(open.join(".gitkeep").is_file());
        assert!(!locked.join(".gitkeep").exists());
        assert!(temp_dir.path().join("refreshed").exists());
    }

    #[compio::test]
    async fn run_rejects_missing_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let result = Application::run(apply_config(
            temp_dir.path().join("missing"),
            ChangeBatch::new(),
        ))
        .await;

        assert!(matches!(result, Err(ApplicationError::RootNotDirectory { .. })));
    }

    #[compio::test]
    async fn run_surfaces_config_errors() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("gitkeeper.yaml"), "- not a map").expect("Failed to write config");

        let result =
            Application::run(apply_config(temp_dir.path().to_path_buf(), ChangeBatch::new())).await;

        assert!(matches!(result, Err(ApplicationError::ConfigError { .. })));
    }
}
