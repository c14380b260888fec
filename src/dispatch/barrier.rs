//! Outstanding-work counter with a blocking drain.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Shared outstanding-work counter
///
/// `add` registers work, `done` retires one unit, and `wait` suspends until
/// the count is zero. Every waiter registered when the count drops to zero is
/// released by that transition, even if new work arrives right after.
#[derive(Debug, Default)]
pub struct CompletionBarrier {
    outstanding: AtomicUsize,
    drained: Notify,
}

impl CompletionBarrier {
    /// Create a barrier with nothing outstanding
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `n` units of outstanding work
    pub fn add(&self, n: usize) {
        let previous = self.outstanding.fetch_add(n, Ordering::AcqRel);
        tracing::trace!(outstanding = previous + n, "Outstanding work registered");
    }

    /// Retire one unit of outstanding work
    ///
    /// Calling this with nothing outstanding is a bookkeeping bug; it is
    /// logged and the count stays at zero.
    pub fn done(&self) {
        match self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => {
                tracing::debug!("Outstanding work drained");
                self.drained.notify_waiters();
            }
            Ok(_) => {}
            Err(_) => {
                tracing::error!("CompletionBarrier::done called with no outstanding work");
            }
        }
    }

    /// Current outstanding count
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Suspend until the outstanding count reaches zero
    ///
    /// Returns immediately if nothing is outstanding.
    pub async fn wait(&self) {
        let notified = self.drained.notified();
        tokio::pin!(notified);

        // Register for the wake-up before reading the count so a transition
        // to zero between the check and the await cannot be missed.
        notified.as_mut().enable();

        if self.outstanding() == 0 {
            return;
        }

        notified.await;
    }

    /// Register one unit of work and return a guard that retires it on drop
    pub fn register(self: &Arc<Self>) -> OutstandingGuard {
        self.add(1);
        OutstandingGuard {
            barrier: Arc::clone(self),
        }
    }
}

/// One registered unit of outstanding work
///
/// Dropping the guard calls [`CompletionBarrier::done`] exactly once, so a
/// task that is discarded before it runs (rejected, or left in the queue at
/// shutdown) can never hold a drain open.
#[derive(Debug)]
pub struct OutstandingGuard {
    barrier: Arc<CompletionBarrier>,
}

impl Drop for OutstandingGuard {
    fn drop(&mut self) {
        self.barrier.done();
    }
}
