//! Shared test helpers for creating Dispatcher instances in tests.

use crate::config::Config;
use crate::dispatch::{Dispatcher, TaskExecutor};
use crate::types::Task;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Small pool and queue so tests start quickly
pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.dispatch.worker_count = 8;
    config.dispatch.queue_capacity = 64;
    config.dispatch.completion_channel_capacity = 64;
    config.dispatch.shutdown_timeout = Duration::from_secs(5);
    config
}

/// Executor that records every task id it runs, optionally after a delay
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    executed: std::sync::Mutex<Vec<i64>>,
    delay: Duration,
}

impl RecordingExecutor {
    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub(crate) fn executed(&self) -> Vec<i64> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskExecutor for RecordingExecutor {
    async fn execute(&self, task: &Task) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.executed.lock().unwrap().push(task.id);
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Executor that holds every task until the test releases it
///
/// Each call to [`GatedExecutor::release`] lets that many executions finish.
pub(crate) struct GatedExecutor {
    gate: tokio::sync::Semaphore,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl GatedExecutor {
    pub(crate) fn new() -> Self {
        Self {
            gate: tokio::sync::Semaphore::new(0),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub(crate) fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub(crate) fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub(crate) fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskExecutor for GatedExecutor {
    async fn execute(&self, _task: &Task) {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.gate.acquire().await.unwrap().forget();
        self.finished.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

/// Executor that panics on every task after counting the attempt
#[derive(Default)]
pub(crate) struct PanickingExecutor {
    attempts: AtomicUsize,
}

impl PanickingExecutor {
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskExecutor for PanickingExecutor {
    async fn execute(&self, task: &Task) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        panic!("executor failed on task {}", task.id);
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Helper to create a test Dispatcher backed by a [`RecordingExecutor`]
pub(crate) async fn create_test_dispatcher() -> (Dispatcher, Arc<RecordingExecutor>) {
    create_test_dispatcher_with(test_config(), Arc::new(RecordingExecutor::default())).await
}

/// Helper to create a test Dispatcher backed by a [`GatedExecutor`]
pub(crate) async fn create_gated_dispatcher() -> (Dispatcher, Arc<GatedExecutor>) {
    create_test_dispatcher_with(test_config(), Arc::new(GatedExecutor::new())).await
}

/// Helper to create a test Dispatcher with an explicit config and executor
pub(crate) async fn create_test_dispatcher_with<E>(
    config: Config,
    executor: Arc<E>,
) -> (Dispatcher, Arc<E>)
where
    E: TaskExecutor + 'static,
{
    let dispatcher = Dispatcher::with_executor(config, executor.clone())
        .await
        .unwrap();
    (dispatcher, executor)
}

/// Poll `condition` every 10ms until it holds, failing the test after 5s
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
