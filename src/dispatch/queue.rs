//! Bounded FIFO intake queue shared by every worker.

use crate::config::QueueFullPolicy;
use crate::error::{Error, Result};

/// Bounded multi-producer, multi-consumer FIFO
///
/// Every worker holds its own clone of the receiver. Each item is handed to
/// exactly one dequeuer, in enqueue order.
pub struct IntakeQueue<T> {
    tx: async_channel::Sender<T>,
    rx: async_channel::Receiver<T>,
    capacity: usize,
    policy: QueueFullPolicy,
}

// Manual impl: cloning the handle must not require `T: Clone`
impl<T> Clone for IntakeQueue<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
            capacity: self.capacity,
            policy: self.policy,
        }
    }
}

impl<T> std::fmt::Debug for IntakeQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntakeQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> IntakeQueue<T> {
    /// Create a queue with `capacity` slots
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; [`crate::Config::validate`] rejects that
    /// before a dispatcher is built.
    pub fn new(capacity: usize, policy: QueueFullPolicy) -> Self {
        let (tx, rx) = async_channel::bounded(capacity);
        Self {
            tx,
            rx,
            capacity,
            policy,
        }
    }

    /// Append an item to the tail
    ///
    /// With [`QueueFullPolicy::Block`] a full queue suspends the caller until a
    /// slot frees. With [`QueueFullPolicy::Reject`] it fails with
    /// [`Error::QueueFull`] and the item is dropped.
    pub async fn enqueue(&self, item: T) -> Result<()> {
        match self.policy {
            QueueFullPolicy::Block => self
                .tx
                .send(item)
                .await
                .map_err(|_| Error::ShuttingDown),
            QueueFullPolicy::Reject => self.tx.try_send(item).map_err(|e| match e {
                async_channel::TrySendError::Full(_) => Error::QueueFull {
                    capacity: self.capacity,
                },
                async_channel::TrySendError::Closed(_) => Error::ShuttingDown,
            }),
        }
    }

    /// Remove and return the head, suspending while the queue is empty
    ///
    /// Returns `None` once the queue is closed and drained. Dropping the
    /// future before it completes never loses an item.
    pub async fn dequeue(&self) -> Option<T> {
        self.rx.recv().await.ok()
    }

    /// Close the queue and hand back whatever was still waiting
    ///
    /// Later `enqueue` calls fail with [`Error::ShuttingDown`], producers
    /// blocked on a full queue are released with the same error, and parked
    /// dequeuers return `None`.
    pub fn close(&self) -> Vec<T> {
        self.rx.close();

        let mut leftover = Vec::new();
        while let Ok(item) = self.rx.try_recv() {
            leftover.push(item);
        }
        leftover
    }

    /// Number of items currently waiting
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no items are waiting
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Fixed capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
