//! Keeps a `.gitkeep` marker in every empty directory touched by a change
//! batch, and removes it once the directory gains content.
//!
//! Everything here is stateless: each batch is reconciled purely from the
//! current filesystem.

mod batch;
mod marker;
mod parents;
mod probe;
mod reconciler;
mod report;
mod unmarker;

pub use batch::ChangeBatch;
pub use reconciler::{MarkerReconciler, RefreshHook};
pub use report::{MarkerAction, MarkerEvent, ReconcileReport};

pub const MARKER_FILE_NAME: &str = ".gitkeep";
