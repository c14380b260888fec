//! Task dispatch core split into focused submodules.
//!
//! The `Dispatcher` struct owns every piece of shared state and its methods
//! are organized by concern:
//! - [`queue`] - Bounded FIFO intake queue
//! - [`worker_pool`] - Workers that drain the queue and launch executions
//! - [`executor`] - Per-task side effects (fetch, pause)
//! - [`barrier`] - Outstanding-work counter and drain
//! - [`aggregator`] - Serialized Completed-total
//! - [`lifecycle`] - Shutdown coordination

mod aggregator;
mod barrier;
mod executor;
mod lifecycle;
mod queue;
mod worker_pool;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use aggregator::CompletionAggregator;
pub use barrier::{CompletionBarrier, OutstandingGuard};
pub use executor::{HttpTaskExecutor, TaskExecutor};
pub use queue::IntakeQueue;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{DispatchStats, Event, Task};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Buffer size of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// A task waiting in the intake queue together with its barrier registration
///
/// The registration travels with the task until its execution finishes, so
/// whichever path ends the task's life (completion, rejection, or discard at
/// shutdown) retires it exactly once.
pub(crate) struct QueuedTask {
    pub(crate) task: Task,
    pub(crate) registration: OutstandingGuard,
}

/// Shutdown coordination state
#[derive(Clone)]
pub(crate) struct LifecycleState {
    /// Cleared when shutdown begins; submissions are refused afterwards
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Cancels the worker polling loops
    pub(crate) shutdown_token: tokio_util::sync::CancellationToken,
    /// Join handles of the worker pool
    pub(crate) workers: Arc<tokio::sync::Mutex<Vec<tokio::task::JoinHandle<()>>>>,
}

/// Main dispatcher instance (cloneable - all fields are Arc-wrapped or handles)
#[derive(Clone)]
pub struct Dispatcher {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Intake queue feeding the worker pool
    pub(crate) queue: IntakeQueue<QueuedTask>,
    /// Outstanding-work counter
    pub(crate) barrier: Arc<CompletionBarrier>,
    /// Completed-total owner
    pub(crate) aggregator: CompletionAggregator,
    /// Performs each task's side effects (trait object for pluggable implementations)
    pub(crate) executor: Arc<dyn TaskExecutor>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Shutdown coordination
    pub(crate) lifecycle: LifecycleState,
}

impl Dispatcher {
    /// Create a dispatcher that executes tasks over HTTP
    ///
    /// Validates the configuration, starts the completion aggregator, and
    /// spawns the worker pool.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let executor: Arc<dyn TaskExecutor> = Arc::new(HttpTaskExecutor::new(&config.fetch)?);
        Self::with_executor(config, executor).await
    }

    /// Create a dispatcher with a custom task executor
    pub async fn with_executor(config: Config, executor: Arc<dyn TaskExecutor>) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let queue = IntakeQueue::new(
            config.dispatch.queue_capacity,
            config.dispatch.queue_full_policy,
        );

        // The consumer runs for as long as any handle to the aggregator exists
        let (aggregator, _consumer) =
            CompletionAggregator::spawn(config.dispatch.completion_channel_capacity);

        let lifecycle = LifecycleState {
            accepting_new: Arc::new(AtomicBool::new(true)),
            shutdown_token: tokio_util::sync::CancellationToken::new(),
            workers: Arc::new(tokio::sync::Mutex::new(Vec::new())),
        };

        let dispatcher = Self {
            config: Arc::new(config),
            queue,
            barrier: Arc::new(CompletionBarrier::new()),
            aggregator,
            executor,
            event_tx,
            lifecycle,
        };

        let workers = dispatcher.start_worker_pool();
        *dispatcher.lifecycle.workers.lock().await = workers;

        tracing::info!(
            executor = dispatcher.executor.name(),
            workers = dispatcher.config.dispatch.worker_count,
            queue_capacity = dispatcher.queue.capacity(),
            policy = ?dispatcher.config.dispatch.queue_full_policy,
            "Dispatcher started"
        );

        Ok(dispatcher)
    }

    /// Queue `count` copies of `task`
    ///
    /// Returns the number of copies queued; a count of zero or less queues
    /// nothing. Under the block policy this waits for queue space as needed.
    /// Under the reject policy a full queue stops the batch with
    /// [`Error::QueueFull`]; copies queued before that point still run.
    pub async fn submit(&self, task: &Task, count: i64) -> Result<usize> {
        let copies = usize::try_from(count).unwrap_or(0);

        for queued in 0..copies {
            if let Err(e) = self.enqueue(task.clone()).await {
                tracing::warn!(
                    task_id = task.id,
                    queued,
                    requested = copies,
                    error = %e,
                    "Submission stopped before all copies were queued"
                );
                return Err(e);
            }
        }

        tracing::info!(task_id = task.id, count = copies, "Tasks queued");
        Ok(copies)
    }

    /// Queue a single task
    ///
    /// The task counts as outstanding from the moment it is accepted, so a
    /// [`Dispatcher::wait`] issued right after this returns covers it even if
    /// no worker has picked it up yet.
    pub async fn enqueue(&self, task: Task) -> Result<()> {
        if !self.is_accepting() {
            return Err(Error::ShuttingDown);
        }

        let id = task.id;
        let registration = self.barrier.register();
        // On failure the QueuedTask is dropped, which retires the registration
        self.queue.enqueue(QueuedTask { task, registration }).await?;

        self.emit_event(Event::TaskQueued { id });
        Ok(())
    }

    /// Suspend until every accepted task has finished
    ///
    /// Returns Completed-total including every task that finished before the
    /// drain. Returns immediately when nothing is outstanding.
    pub async fn wait(&self) -> u64 {
        self.barrier.wait().await;
        let completed = self.aggregator.sync().await;

        tracing::debug!(completed, "Drain observed");
        self.emit_event(Event::Drained { completed });
        completed
    }

    /// Completed-total as last published (may lag in-flight completions)
    pub fn completed_total(&self) -> u64 {
        self.aggregator.total()
    }

    /// Tasks accepted but not yet finished
    pub fn outstanding(&self) -> usize {
        self.barrier.outstanding()
    }

    /// Tasks waiting in the intake queue
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Whether new submissions are accepted
    pub fn is_accepting(&self) -> bool {
        self.lifecycle.accepting_new.load(Ordering::SeqCst)
    }

    /// Snapshot of counters and sizing
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            outstanding: self.outstanding(),
            completed: self.completed_total(),
            queued: self.queued(),
            queue_capacity: self.queue.capacity(),
            worker_count: self.config.dispatch.worker_count,
            accepting_new: self.is_accepting(),
        }
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Subscribe to task lifecycle events
    ///
    /// Multiple subscribers are supported. A subscriber that falls more than
    /// 1000 events behind receives `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Dropped silently when nobody is listening.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
