//! Cancellation and deadline carrier for requests.
//!
//! A [`Context`] is cheap to clone and is passed into the builder with
//! `set_context`. Child contexts inherit every cancellation signal and the
//! deadline of their parent, so cancelling a parent stops all requests that
//! were given one of its children.

use std::time::Duration;

use futures_util::future::select_all;
use tokio::sync::watch;
use tokio::time::Instant;

use super::error::ContextError;

/// Carries cancellation signals and an optional deadline into a request.
#[derive(Debug, Clone, Default)]
pub struct Context {
    signals: Vec<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels the context returned alongside it by [`Context::with_cancel`].
///
/// Dropping the handle without calling [`CancelHandle::cancel`] leaves the
/// context live.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancels the associated context and all of its children.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a child context plus the handle that cancels it.
    #[must_use]
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        let mut child = self.clone();
        child.signals.push(receiver);
        (child, CancelHandle { sender })
    }

    /// Returns a child context that expires at `deadline`, or at the
    /// parent's deadline if that is earlier.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut child = self.clone();
        child.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        child
    }

    /// Returns a child context that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The instant this context expires, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the context is done, or `None` while it is still live.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        if self.signals.iter().any(|signal| *signal.borrow()) {
            return Some(ContextError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(ContextError::DeadlineExceeded);
        }
        None
    }

    /// Resolves once the context is cancelled or its deadline passes.
    ///
    /// Never resolves for [`Context::background`].
    pub async fn done(&self) -> ContextError {
        let cancelled = async {
            if self.signals.is_empty() {
                return std::future::pending::<()>().await;
            }
            let waits = self.signals.iter().cloned().map(|mut signal| {
                Box::pin(async move {
                    // A dropped handle can no longer cancel.
                    if signal.wait_for(|cancelled| *cancelled).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                })
            });
            select_all(waits).await;
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => ContextError::Cancelled,
            () = expired => ContextError::DeadlineExceeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        let ctx = Context::background();
        assert_eq!(ctx.err(), None);
        assert_eq!(ctx.deadline(), None);
    }

    #[test]
    fn test_cancel_marks_context_and_children() {
        let (parent, handle) = Context::background().with_cancel();
        let (child, _child_handle) = parent.with_cancel();
        assert_eq!(child.err(), None);

        handle.cancel();
        assert_eq!(parent.err(), Some(ContextError::Cancelled));
        assert_eq!(child.err(), Some(ContextError::Cancelled));
    }

    #[test]
    fn test_cancelling_child_leaves_parent_live() {
        let (parent, _handle) = Context::background().with_cancel();
        let (child, child_handle) = parent.with_cancel();
        child_handle.cancel();
        assert_eq!(child.err(), Some(ContextError::Cancelled));
        assert_eq!(parent.err(), None);
    }

    #[tokio::test]
    async fn test_with_deadline_keeps_earlier_deadline() {
        let now = Instant::now();
        let parent = Context::background().with_deadline(now + Duration::from_secs(5));
        let child = parent.with_deadline(now + Duration::from_secs(60));
        assert_eq!(child.deadline(), Some(now + Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_done_resolves_on_cancel() {
        let (ctx, handle) = Context::background().with_cancel();
        let waiter = tokio::spawn(async move { ctx.done().await });
        handle.cancel();
        assert_eq!(waiter.await.unwrap(), ContextError::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_resolves_on_deadline() {
        let ctx = Context::background().with_timeout(Duration::from_millis(50));
        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_never_cancels() {
        let (ctx, handle) = Context::background().with_cancel();
        drop(handle);
        let outcome = tokio::time::timeout(Duration::from_secs(1), ctx.done()).await;
        assert!(outcome.is_err(), "done() must stay pending");
        assert_eq!(ctx.err(), None);
    }
}
