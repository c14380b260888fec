//! Serialized completion counter.
//!
//! Executions report completion by message instead of bumping a shared
//! counter under a lock. A single consumer task owns the increment and
//! publishes the running total for readers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug)]
enum CompletionSignal {
    /// One task execution returned
    Finished,
    /// Reply with the total once every earlier signal has been applied
    Flush(oneshot::Sender<u64>),
}

/// Handle to the completion aggregator (cheap to clone)
///
/// Only the consumer spawned by [`CompletionAggregator::spawn`] writes the
/// total. Readers may see a value that lags the most recent completions, but
/// never one that goes backwards.
#[derive(Clone, Debug)]
pub struct CompletionAggregator {
    tx: mpsc::Sender<CompletionSignal>,
    total: Arc<AtomicU64>,
}

impl CompletionAggregator {
    /// Start the consumer task and return a handle to it
    ///
    /// `capacity` bounds the number of unapplied signals; senders wait when
    /// the consumer falls that far behind.
    pub fn spawn(capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let total = Arc::new(AtomicU64::new(0));

        let handle = tokio::spawn(run_consumer(rx, Arc::clone(&total)));

        (Self { tx, total }, handle)
    }

    /// Report one finished task execution
    pub async fn record(&self) {
        if self.tx.send(CompletionSignal::Finished).await.is_err() {
            tracing::warn!("Completion aggregator stopped, completion not counted");
        }
    }

    /// Completed-total as last published by the consumer
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Wait until every signal sent before this call has been applied
    ///
    /// Returns the total at that point.
    pub async fn sync(&self) -> u64 {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(CompletionSignal::Flush(ack_tx)).await.is_err() {
            return self.total();
        }
        ack_rx.await.unwrap_or_else(|_| self.total())
    }
}

async fn run_consumer(mut rx: mpsc::Receiver<CompletionSignal>, total: Arc<AtomicU64>) {
    let mut completed = total.load(Ordering::Acquire);

    while let Some(signal) = rx.recv().await {
        match signal {
            CompletionSignal::Finished => {
                completed += 1;
                total.store(completed, Ordering::Release);
                tracing::trace!(completed, "Completion recorded");
            }
            CompletionSignal::Flush(ack) => {
                // Waiter may have gone away
                ack.send(completed).ok();
            }
        }
    }

    tracing::debug!(completed, "Completion aggregator stopped");
}
