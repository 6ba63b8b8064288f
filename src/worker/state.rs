//! Worker lifecycle state and the shared abort handle

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Lifecycle of a `ParserWorker`
///
/// `Idle → Running → Completed | Aborted`; a worker runs at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WorkerState {
    Idle,
    Running,
    Completed,
    Aborted,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Default)]
struct HandleInner {
    running: AtomicUsize,
    aborted: AtomicBool,
    wake: Notify,
}

/// Cloneable control handle for one or more workers
///
/// Abort is cooperative: it is observed at the top of every position and
/// inside every backoff wait. Once aborted, a handle stays aborted, so a
/// worker started later with the same handle stops before its first load.
#[derive(Debug, Clone, Default)]
pub struct WorkerHandle {
    inner: Arc<HandleInner>,
}

impl WorkerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests every worker sharing this handle to stop
    pub fn abort(&self) {
        self.inner.aborted.store(true, Ordering::SeqCst);
        self.inner.wake.notify_waiters();
    }

    /// True while at least one worker is running and no abort has been requested
    pub fn is_active(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst) > 0 && !self.is_aborted()
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::SeqCst)
    }

    pub(crate) fn activate(&self) {
        self.inner.running.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn deactivate(&self) {
        let _ = self
            .inner
            .running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// Sleeps for `delay` unless an abort arrives first
    ///
    /// Returns false if the handle was aborted before or during the wait.
    pub(crate) async fn pause(&self, delay: Duration) -> bool {
        let notified = self.inner.wake.notified();
        tokio::pin!(notified);
        // Register interest before the check so an abort in between still wakes us
        notified.as_mut().enable();

        if self.is_aborted() {
            return false;
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = &mut notified => {}
        }

        !self.is_aborted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_display() {
        assert_eq!(WorkerState::Aborted.to_string(), "aborted");
    }

    #[test]
    fn test_activate_and_abort() {
        let handle = WorkerHandle::new();
        assert!(!handle.is_active());

        handle.activate();
        assert!(handle.is_active());

        handle.abort();
        assert!(!handle.is_active());
        assert!(handle.is_aborted());
    }

    #[test]
    fn test_abort_is_sticky() {
        let handle = WorkerHandle::new();
        handle.abort();
        handle.activate();
        assert!(!handle.is_active());
    }

    #[test]
    fn test_active_until_last_worker_stops() {
        let handle = WorkerHandle::new();
        handle.activate();
        handle.activate();

        handle.deactivate();
        assert!(handle.is_active());

        handle.deactivate();
        assert!(!handle.is_active());

        handle.deactivate();
        assert!(!handle.is_active());
    }

    #[test]
    fn test_clones_share_state() {
        let handle = WorkerHandle::new();
        let other = handle.clone();
        handle.activate();
        other.abort();
        assert!(handle.is_aborted());
    }

    #[tokio::test]
    async fn test_pause_completes() {
        let handle = WorkerHandle::new();
        assert!(handle.pause(Duration::from_millis(5)).await);
    }

    #[tokio::test]
    async fn test_pause_after_abort_returns_immediately() {
        let handle = WorkerHandle::new();
        handle.abort();
        let start = Instant::now();
        assert!(!handle.pause(Duration::from_secs(30)).await);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_abort_wakes_pause() {
        let handle = WorkerHandle::new();
        let aborter = handle.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            aborter.abort();
        });

        let start = Instant::now();
        assert!(!handle.pause(Duration::from_secs(30)).await);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
