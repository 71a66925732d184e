//! Cancellation signal threaded through command work.
//!
//! A `Cancellation` is the observer half of a one-shot signal; the
//! `CancellationGuard` is the firing half and fires when dropped unless
//! disarmed. The HTTP adapter holds the guard inside the request future,
//! so a client disconnect (the future is dropped) becomes a cancellation
//! signal for the detached command work.
//!
//! Cancellation never aborts an in-progress write: handlers consult the
//! signal only at safe points, before the transaction and inside the peer
//! probe. The save itself is bounded by the watchdog, not by the caller.

use tokio::sync::watch;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Observer half of a cancellation signal.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// Creates a linked guard/observer pair.
    pub fn pair() -> (CancellationGuard, Cancellation) {
        let (tx, rx) = watch::channel(false);
        (CancellationGuard { tx, armed: true }, Cancellation { rx })
    }

    /// A signal that never fires, for workers and tests.
    pub fn never() -> Cancellation {
        let (_tx, rx) = watch::channel(false);
        Cancellation { rx }
    }

    /// Returns true once the caller has given up.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when the caller gives up. Pends forever if the guard was
    /// disarmed or the signal is `never()`.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                // Guard gone without firing: cancellation can no longer
                // occur.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Fails with `Cancelled` once the caller has given up. Called at safe
    /// points only; never between a domain write and its outbox row.
    pub fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_cancelled() {
            return Err(DomainError::new(
                ErrorCode::Cancelled,
                "Caller abandoned the request",
            ));
        }
        Ok(())
    }
}

/// Firing half of a cancellation signal. Fires on drop unless disarmed,
/// which is what turns an abandoned request future into a signal.
#[derive(Debug)]
pub struct CancellationGuard {
    tx: watch::Sender<bool>,
    armed: bool,
}

impl CancellationGuard {
    /// Marks the request as completed; dropping no longer fires.
    pub fn disarm(mut self) {
        self.armed = false;
    }

    /// Fires the signal explicitly.
    pub fn cancel(mut self) {
        self.armed = false;
        let _ = self.tx.send(true);
    }
}

impl Drop for CancellationGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.tx.send(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn dropping_the_guard_fires_the_signal() {
        let (guard, cancel) = Cancellation::pair();
        assert!(!cancel.is_cancelled());

        drop(guard);

        assert!(cancel.is_cancelled());
        timeout(Duration::from_millis(50), cancel.cancelled())
            .await
            .expect("cancelled() should resolve");
    }

    #[tokio::test]
    async fn disarmed_guard_never_fires() {
        let (guard, cancel) = Cancellation::pair();
        guard.disarm();

        assert!(!cancel.is_cancelled());
        assert!(timeout(Duration::from_millis(20), cancel.cancelled())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn explicit_cancel_fires_immediately() {
        let (guard, cancel) = Cancellation::pair();
        guard.cancel();
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn never_stays_quiet() {
        let cancel = Cancellation::never();
        assert!(!cancel.is_cancelled());
        assert!(cancel.ensure_active().is_ok());
        assert!(timeout(Duration::from_millis(20), cancel.cancelled())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn ensure_active_reports_cancelled() {
        let (guard, cancel) = Cancellation::pair();
        guard.cancel();

        let err = cancel.ensure_active().unwrap_err();
        assert_eq!(err.code, ErrorCode::Cancelled);
    }

    #[tokio::test]
    async fn clones_observe_the_same_signal() {
        let (guard, cancel) = Cancellation::pair();
        let clone = cancel.clone();
        guard.cancel();
        assert!(clone.is_cancelled());
    }
}
