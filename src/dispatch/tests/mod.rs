use super::test_helpers::*;
use super::*;
use crate::types::Event;
use std::time::Duration;

mod backpressure;

fn sample_task(id: i64) -> Task {
    Task {
        id,
        kind: "test".to_string(),
        ..Default::default()
    }
}

/// Stop the worker pool without closing the queue, so submissions pile up
async fn stop_workers(dispatcher: &Dispatcher) {
    dispatcher.lifecycle.shutdown_token.cancel();
    let workers = std::mem::take(&mut *dispatcher.lifecycle.workers.lock().await);
    for worker in workers {
        worker.await.unwrap();
    }
}
