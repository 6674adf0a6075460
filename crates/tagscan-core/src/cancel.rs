//! Cooperative single-flight cancellation.
//!
//! Every scan runs under a [`TaskToken`]. Starting a newer task (or rebuilding the engine)
//! makes older tokens stale; the extractor checks its token before each outer match and
//! unwinds with [`Cancelled`] once the token is stale. Cancellation is a control-flow
//! signal, not a fault.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

/// Returned when a scan is superseded by a newer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
#[error("scan cancelled by a newer task")]
pub struct Cancelled;

/// A point where a running scan may be interrupted.
pub trait Checkpoint {
    /// Returns `Err(Cancelled)` if the scan must stop.
    fn checkpoint(&self) -> Result<(), Cancelled>;
}

/// A checkpoint that never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Checkpoint for NeverCancel {
    fn checkpoint(&self) -> Result<(), Cancelled> {
        Ok(())
    }
}

/// Closures report whether the scan is still current; `false` cancels.
impl<F> Checkpoint for F
where
    F: Fn() -> bool,
{
    fn checkpoint(&self) -> Result<(), Cancelled> {
        if self() { Ok(()) } else { Err(Cancelled) }
    }
}

/// Both checkpoints must pass.
impl<A, B> Checkpoint for (A, B)
where
    A: Checkpoint,
    B: Checkpoint,
{
    fn checkpoint(&self) -> Result<(), Cancelled> {
        self.0.checkpoint()?;
        self.1.checkpoint()
    }
}

/// Hands out task ids and knows which one is current.
///
/// Cloning shares the counter, so a clone can invalidate tokens handed out by the original.
#[derive(Debug, Clone, Default)]
pub struct TaskTracker {
    current: Arc<AtomicU64>,
}

impl TaskTracker {
    /// Create a tracker with no running task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new task, invalidating every previously issued token.
    pub fn begin(&self) -> TaskToken {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        TaskToken {
            id: TaskId(id),
            current: Arc::clone(&self.current),
        }
    }

    /// A token for the current task that goes stale on the next `begin`/`cancel_all`.
    pub fn watch(&self) -> TaskToken {
        TaskToken {
            id: self.current(),
            current: Arc::clone(&self.current),
        }
    }

    /// Invalidate every issued token without starting a new task.
    pub fn cancel_all(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    /// The id of the most recently started (or cancelled) task.
    pub fn current(&self) -> TaskId {
        TaskId(self.current.load(Ordering::SeqCst))
    }
}

/// Token held by a running scan.
#[derive(Debug, Clone)]
pub struct TaskToken {
    id: TaskId,
    current: Arc<AtomicU64>,
}

impl TaskToken {
    /// This token's task id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns `true` while no newer task has started.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id.0
    }
}

impl Checkpoint for TaskToken {
    fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_current() {
            Ok(())
        } else {
            Err(Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_task_invalidates_older_token() {
        let tracker = TaskTracker::new();
        let first = tracker.begin();
        assert!(first.checkpoint().is_ok());

        let second = tracker.begin();
        assert!(second.id() > first.id());
        assert_eq!(first.checkpoint(), Err(Cancelled));
        assert!(second.checkpoint().is_ok());
        assert_eq!(tracker.current(), second.id());
    }

    #[test]
    fn test_cancel_all_and_shared_clone() {
        let tracker = TaskTracker::new();
        let token = tracker.begin();
        tracker.clone().cancel_all();
        assert!(!token.is_current());
    }

    #[test]
    fn test_watch_and_pair_checkpoint() {
        let generation = TaskTracker::new();
        let tasks = TaskTracker::new();
        let pair = (tasks.begin(), generation.watch());
        assert!(pair.checkpoint().is_ok());

        generation.cancel_all();
        assert_eq!(pair.checkpoint(), Err(Cancelled));
    }

    #[test]
    fn test_closure_checkpoint() {
        let ok = || true;
        let stop = || false;
        assert!(ok.checkpoint().is_ok());
        assert_eq!(stop.checkpoint(), Err(Cancelled));
        assert!(NeverCancel.checkpoint().is_ok());
    }
}
