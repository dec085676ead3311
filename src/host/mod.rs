//! Host adapter: native filesystem events in, reconciled batches and a
//! refresh command out.

mod batch_collector;
mod refresh;
mod reporter;
mod watcher;

pub use refresh::HostRefresh;
pub use reporter::{init_colors, print_report};
pub use watcher::{TreeWatcher, WatchError};
