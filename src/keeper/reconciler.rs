use tracing::debug;

use super::batch::ChangeBatch;
use super::marker::EmptyDirectoryMarker;
use super::parents::ParentCollector;
use super::report::{MarkerAction, ReconcileReport};
use super::unmarker::FilledDirectoryUnmarker;

/// Host callback invoked once after every batch so the host can re-index
/// the tree.
pub trait RefreshHook {
    async fn refresh(&self);
}

/// Stateless reconciliation of markers in response to one change batch.
pub struct MarkerReconciler;

impl MarkerReconciler {
    /// Runs reconciliation then the refresh hook, exactly once, whatever the
    /// batch contained.
    pub async fn on_batch(batch: &ChangeBatch, hook: &impl RefreshHook) -> ReconcileReport {
        let report = Self::reconcile(batch);
        hook.refresh().await;
        report
    }

    /// Filesystem side of [`Self::on_batch`], without the refresh.
    pub fn reconcile(batch: &ChangeBatch) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if !batch.imported.is_empty() {
            debug!("Reconciling {} imported paths", batch.imported.len());
            let (marked, parents) = EmptyDirectoryMarker::mark_with_parents(&batch.imported);
            report.absorb(MarkerAction::Create, marked);
            // A parent that just received a child is no longer empty
            report.absorb(MarkerAction::Delete, FilledDirectoryUnmarker::unmark(&parents));
        }

        if !batch.deleted.is_empty() {
            debug!("Reconciling {} deleted paths", batch.deleted.len());
            let parents = ParentCollector::parents(&batch.deleted);
            report.absorb(MarkerAction::Create, EmptyDirectoryMarker::mark(&parents));
        }

        if !batch.moved_from.is_empty() {
            debug!(
                "Reconciling {} moves ({} destinations)",
                batch.moved_from.len(),
                batch.moved.len()
            );
            report.absorb(
                MarkerAction::Create,
                EmptyDirectoryMarker::mark(&batch.moved_from),
            );
            // A source directory that lost its last entry to the move
            let vacated = ParentCollector::parents(&batch.moved_from);
            report.absorb(MarkerAction::Create, EmptyDirectoryMarker::mark(&vacated));
            let parents = ParentCollector::parents(&batch.moved);
            report.absorb(MarkerAction::Delete, FilledDirectoryUnmarker::unmark(&parents));
        }

        report
    }
}
