//! Owned cancellation for one in-flight turn.
//!
//! A [`CancelHandle`] is the single owner of a turn's cancellation. It cannot
//! be cloned, and both ways of letting go of it ([`cancel`](CancelHandle::cancel)
//! and [`release`](CancelHandle::release)) consume it, so a holder can never
//! end up with two live handles for one turn. Dropping a handle cancels the
//! turn, which is what tears down an in-flight stream when its session goes
//! away.
//!
//! The read side is a [`CancelSignal`], cloned freely into the transport and
//! relay tasks.

use tokio_util::sync::CancellationToken;

/// Exclusive, non-cloneable cancellation handle.
#[derive(Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Create a handle for a new turn.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Observer side of this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            token: self.token.clone(),
        }
    }

    /// Stop the turn: the transport read is abandoned and no further records
    /// are produced.
    pub fn cancel(self) {
        tracing::debug!("turn cancelled");
        // Drop performs the cancellation.
    }

    /// Give the handle up after the turn reached a terminal state on its own.
    ///
    /// Any transport read still outstanding is stopped as well; nothing after
    /// a terminal record is of interest.
    pub fn release(self) {
        tracing::trace!("turn handle released");
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Read-only view of a [`CancelHandle`].
#[derive(Debug, Clone)]
pub struct CancelSignal {
    token: CancellationToken,
}

impl CancelSignal {
    /// A signal that is never triggered.
    pub fn never() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Whether the owning handle has cancelled (or been dropped).
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the owning handle has cancelled (or been dropped).
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_triggers_signal() {
        let handle = CancelHandle::new();
        let signal = handle.signal();
        assert!(!signal.is_cancelled());

        handle.cancel();
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_drop_triggers_signal() {
        let handle = CancelHandle::new();
        let signal = handle.signal();
        drop(handle);
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_release_stops_outstanding_reads() {
        let handle = CancelHandle::new();
        let signal = handle.signal();
        handle.release();
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_handles_are_independent() {
        let first = CancelHandle::new();
        let second = CancelHandle::new();
        let first_signal = first.signal();
        let second_signal = second.signal();

        first.cancel();
        assert!(first_signal.is_cancelled());
        assert!(!second_signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let handle = CancelHandle::new();
        let signal = handle.signal();

        let waiter = tokio::spawn(async move { signal.cancelled().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[test]
    fn test_never_is_not_cancelled() {
        assert!(!CancelSignal::never().is_cancelled());
    }
}
