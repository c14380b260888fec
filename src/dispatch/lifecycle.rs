//! Shutdown coordination.

use crate::error::Result;
use crate::types::Event;

use super::Dispatcher;

impl Dispatcher {
    /// Gracefully shut down the dispatcher
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new submissions
    /// 2. Waits for outstanding tasks (queued and running) up to `shutdown_timeout`
    /// 3. Stops the worker pool
    /// 4. Closes the intake queue, discarding tasks that never started
    ///
    /// Executions already launched are not cancelled; they keep running in
    /// the background until they return on their own.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        // 1. Stop accepting new tasks
        self.lifecycle
            .accepting_new
            .store(false, std::sync::atomic::Ordering::SeqCst);
        tracing::info!("Stopped accepting new tasks");

        // 2. Let the workers keep draining until everything finishes or we time out
        let shutdown_timeout = self.config.dispatch.shutdown_timeout;
        match tokio::time::timeout(shutdown_timeout, self.barrier.wait()).await {
            Ok(()) => {
                tracing::info!("All outstanding tasks completed");
            }
            Err(_) => {
                tracing::warn!(
                    outstanding = self.outstanding(),
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Timeout waiting for outstanding tasks, proceeding with shutdown"
                );
            }
        }

        // 3. Stop the worker pool
        self.lifecycle.shutdown_token.cancel();
        let workers = std::mem::take(&mut *self.lifecycle.workers.lock().await);
        let worker_count = workers.len();
        for worker in workers {
            if let Err(e) = worker.await
                && !e.is_cancelled()
            {
                tracing::error!(error = %e, "Worker task failed");
            }
        }
        tracing::info!(worker_count, "Worker pool stopped");

        // 4. Close the queue; dropping leftovers retires their registrations
        let discarded = self.queue.close();
        if !discarded.is_empty() {
            tracing::warn!(
                discarded = discarded.len(),
                "Discarded queued tasks that never started"
            );
        }
        drop(discarded);

        self.emit_event(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}
