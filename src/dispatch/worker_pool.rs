//! Worker pool: drains the intake queue and launches task executions.

use std::sync::Arc;

use super::{CompletionAggregator, Dispatcher, OutstandingGuard, QueuedTask, TaskExecutor};
use crate::types::{Event, Task};

/// Everything a launched execution needs, cloned once per worker
#[derive(Clone)]
struct ExecutionContext {
    executor: Arc<dyn TaskExecutor>,
    aggregator: CompletionAggregator,
    event_tx: tokio::sync::broadcast::Sender<Event>,
}

/// Completion notifications owed by one running task
///
/// Consumed by [`CompletionHandle::finish`], which signals the aggregator and
/// then releases the barrier registration. Both happen exactly once because
/// the handle cannot be used twice.
struct CompletionHandle {
    task_id: i64,
    aggregator: CompletionAggregator,
    registration: OutstandingGuard,
    event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl CompletionHandle {
    async fn finish(self) {
        // Count first so a drain that observes the barrier at zero is always
        // followed by a Completed-total that includes this task
        self.aggregator.record().await;
        self.event_tx
            .send(Event::TaskCompleted { id: self.task_id })
            .ok();
        drop(self.registration);
    }
}

impl ExecutionContext {
    /// Launch one task as an independent tokio task and return immediately
    fn launch(&self, task: Task, registration: OutstandingGuard) {
        let completion = CompletionHandle {
            task_id: task.id,
            aggregator: self.aggregator.clone(),
            registration,
            event_tx: self.event_tx.clone(),
        };
        let executor = Arc::clone(&self.executor);

        self.event_tx.send(Event::TaskStarted { id: task.id }).ok();

        tokio::spawn(async move {
            let task_id = task.id;
            // Inner task isolates executor panics from the completion pair
            let execution = tokio::spawn(async move { executor.execute(&task).await });
            if let Err(e) = execution.await {
                tracing::error!(task_id, error = %e, "Task execution panicked");
            }
            completion.finish().await;
        });
    }
}

impl Dispatcher {
    /// Spawn the configured number of queue workers
    ///
    /// Each worker loops:
    /// 1. Waits for the next task in the intake queue
    /// 2. Launches the task's execution in its own tokio task
    /// 3. Goes straight back to the queue without waiting for the execution
    ///
    /// The pool size therefore bounds concurrent dequeuing only; execution
    /// concurrency is bounded by how many tasks have been dequeued.
    /// Workers exit when the shutdown token fires or the queue closes.
    pub(crate) fn start_worker_pool(&self) -> Vec<tokio::task::JoinHandle<()>> {
        let context = ExecutionContext {
            executor: Arc::clone(&self.executor),
            aggregator: self.aggregator.clone(),
            event_tx: self.event_tx.clone(),
        };

        (0..self.config.dispatch.worker_count)
            .map(|worker_id| self.spawn_worker(worker_id, context.clone()))
            .collect()
    }

    fn spawn_worker(
        &self,
        worker_id: usize,
        context: ExecutionContext,
    ) -> tokio::task::JoinHandle<()> {
        let queue = self.queue.clone();
        let shutdown_token = self.lifecycle.shutdown_token.clone();

        tokio::spawn(async move {
            loop {
                let next = tokio::select! {
                    _ = shutdown_token.cancelled() => break,
                    next = queue.dequeue() => next,
                };

                let Some(QueuedTask { task, registration }) = next else {
                    // Queue closed and drained
                    break;
                };

                tracing::debug!(worker_id, task_id = task.id, "Task received");
                context.launch(task, registration);
            }

            tracing::trace!(worker_id, "Worker stopped");
        })
    }
}
