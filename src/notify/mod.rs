//! Result notifiers
//!
//! A worker reports every extracted result and its own completion to a
//! `Notifier`. Notifiers are infallible from the worker's point of view:
//! anything that goes wrong while reporting is logged, never returned.

mod collecting;
mod log;

pub use collecting::CollectingNotifier;
pub use log::LogNotifier;

/// Receives results from a worker
///
/// Implementations are shared between tasks and must be thread-safe.
pub trait Notifier<T>: Send + Sync {
    /// Called once per successfully extracted page
    ///
    /// # Arguments
    ///
    /// * `source` - Name of the worker that produced the result
    /// * `record` - The extracted result
    fn on_new_data(&self, source: &str, record: &T);

    /// Called exactly once when a worker stops, whether it completed or was aborted
    fn on_completed(&self, source: &str);
}
