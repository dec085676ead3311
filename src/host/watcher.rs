use std::path::{Path, PathBuf};
use std::time::Duration;

use compio::time::timeout;
use futures::StreamExt;
use futures_channel::mpsc::{self, UnboundedReceiver};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use snafu::{ResultExt, Snafu};
use tracing::{debug, error, info};

use super::batch_collector::BatchCollector;
use super::refresh::HostRefresh;
use super::reporter::print_report;
use crate::keeper::MarkerReconciler;

type NotifyResult = Result<notify::Event, notify::Error>;

/// Watches a project tree and reconciles markers once per quiet period.
pub struct TreeWatcher {
    root: PathBuf,
    debounce: Duration,
    exclude: Vec<String>,
    refresh: HostRefresh,
}

impl TreeWatcher {
    pub fn new(root: PathBuf, debounce: Duration, exclude: Vec<String>, refresh: HostRefresh) -> Self {
        Self {
            root,
            debounce,
            exclude,
            refresh,
        }
    }

    /// Runs until the underlying watcher shuts down. Batches are reconciled
    /// strictly one at a time.
    pub async fn run(&self) -> Result<(), WatchError> {
        let (_watcher, receiver) = Self::start(&self.root)?;
        info!("Watching {} for changes", self.root.display());

        let batches = self.pump(receiver).await;

        info!(
            "Watcher for {} stopped after {} batches",
            self.root.display(),
            batches
        );
        Ok(())
    }

    /// Reconciles one batch per event burst until the channel closes.
    /// Returns the number of batches reconciled.
    async fn pump(&self, mut receiver: UnboundedReceiver<NotifyResult>) -> usize {
        let mut collector = BatchCollector::new(self.exclude.clone());
        let mut batches = 0;

        while let Some(first) = receiver.next().await {
            Self::collect(&mut collector, first);
            let closed = self.drain_until_quiet(&mut receiver, &mut collector).await;

            if collector.is_empty() {
                debug!("Event burst produced no relevant paths");
            } else {
                let batch = collector.take();
                debug!("Reconciling batch of {} paths", batch.len());
                let report = MarkerReconciler::on_batch(&batch, &self.refresh).await;
                print_report(&report);
                batches += 1;
            }

            if closed {
                break;
            }
        }

        batches
    }

    fn start(root: &Path) -> Result<(RecommendedWatcher, UnboundedReceiver<NotifyResult>), WatchError> {
        let (sender, receiver) = mpsc::unbounded::<NotifyResult>();

        let mut watcher = notify::recommended_watcher(move |res: NotifyResult| {
            if let Err(send_err) = sender.unbounded_send(res) {
                debug!("Dropping filesystem event: {}", send_err);
            }
        })
        .context(CreateSnafu)?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .context(WatchPathSnafu { path: root })?;

        Ok((watcher, receiver))
    }

    /// Pulls events until none arrives for a full debounce period. Returns
    /// true when the channel closed.
    async fn drain_until_quiet(
        &self,
        receiver: &mut UnboundedReceiver<NotifyResult>,
        collector: &mut BatchCollector,
    ) -> bool {
        loop {
            match timeout(self.debounce, receiver.next()).await {
                Ok(Some(res)) => Self::collect(collector, res),
                Ok(None) => return true,
                Err(_) => return false,
            }
        }
    }

    fn collect(collector: &mut BatchCollector, res: NotifyResult) {
        match res {
            Ok(event) => collector.push(event),
            Err(e) => error!("Watch error: {e}"),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum WatchError {
    #[snafu(display("Failed to create filesystem watcher"))]
    CreateError { source: notify::Error },
    #[snafu(display("Failed to watch {}", path.display()))]
    WatchPathError {
        path: PathBuf,
        source: notify::Error,
    },
}
