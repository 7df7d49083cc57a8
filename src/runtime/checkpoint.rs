//! Readiness checkpoints: completion signals for queued accelerator work

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context as TaskContext, Poll, Waker};

struct Shared {
    complete: AtomicBool,
    waker: Mutex<Option<Waker>>,
}

/// Future resolving once every command queued before it has finished
///
/// Created together with its [`CheckpointSignal`] by [`checkpoint`]. A
/// manager keeps the signal and completes it when the accelerator passes
/// the checkpoint.
pub struct Checkpoint {
    shared: Arc<Shared>,
}

/// Completing side of a [`Checkpoint`]
///
/// Dropping the signal completes the checkpoint, so a waiter never hangs on
/// a command stream that has gone away.
pub struct CheckpointSignal {
    shared: Arc<Shared>,
}

/// Create a checkpoint and its completion signal
pub fn checkpoint() -> (CheckpointSignal, Checkpoint) {
    let shared = Arc::new(Shared {
        complete: AtomicBool::new(false),
        waker: Mutex::new(None),
    });
    (
        CheckpointSignal {
            shared: Arc::clone(&shared),
        },
        Checkpoint { shared },
    )
}

impl Checkpoint {
    /// A checkpoint that is already complete
    ///
    /// For managers whose command stream is synchronous.
    pub fn ready() -> Self {
        let (signal, checkpoint) = checkpoint();
        signal.complete();
        checkpoint
    }

    /// Non-blocking completion check
    pub fn is_complete(&self) -> bool {
        self.shared.complete.load(Ordering::Acquire)
    }
}

impl Future for Checkpoint {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<()> {
        if self.is_complete() {
            return Poll::Ready(());
        }
        *self.shared.waker.lock() = Some(cx.waker().clone());
        // Re-check after registering: the signal may have fired in between.
        if self.is_complete() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl CheckpointSignal {
    /// Mark the checkpoint complete and wake its waiter
    pub fn complete(&self) {
        self.shared.complete.store(true, Ordering::Release);
        if let Some(waker) = self.shared.waker.lock().take() {
            waker.wake();
        }
    }

    /// Whether the checkpoint has been completed
    pub fn is_complete(&self) -> bool {
        self.shared.complete.load(Ordering::Acquire)
    }
}

impl Drop for CheckpointSignal {
    fn drop(&mut self) {
        if !self.is_complete() {
            self.complete();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_checkpoint() {
        assert!(Checkpoint::ready().is_complete());
    }

    #[test]
    fn test_signal_completes() {
        let (signal, cp) = checkpoint();
        assert!(!cp.is_complete());
        signal.complete();
        assert!(cp.is_complete());
    }

    #[test]
    fn test_drop_signal_completes() {
        let (signal, cp) = checkpoint();
        drop(signal);
        assert!(cp.is_complete());
    }

    #[test]
    fn test_pending_until_signalled() {
        let (signal, mut cp) = checkpoint();
        let waker = Waker::noop();
        let mut cx = TaskContext::from_waker(waker);

        assert!(Pin::new(&mut cp).poll(&mut cx).is_pending());
        signal.complete();
        assert!(Pin::new(&mut cp).poll(&mut cx).is_ready());
    }
}
