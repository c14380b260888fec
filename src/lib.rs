//! # task-dispatch
//!
//! HTTP task intake backed by a bounded queue, a large worker pool, a drain
//! barrier, and a serialized completion counter.
//!
//! ## Design
//!
//! - **Bounded intake** - submissions block (or are rejected) once the queue is full
//! - **Fire-and-forget execution** - workers launch each task and go straight back to the queue
//! - **Global drain** - [`Dispatcher::wait`] resolves once every accepted task has finished
//! - **Lock-free counting** - completions flow through a single consumer instead of a shared lock
//!
//! ## Quick Start
//!
//! ```no_run
//! use task_dispatch::{Config, Dispatcher, Task};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::new(Config::default()).await?;
//!
//!     let task = Task {
//!         id: 1,
//!         kind: "ping".to_string(),
//!         url: "https://example.com".to_string(),
//!         sleep_duration: 1,
//!     };
//!     dispatcher.submit(&task, 5).await?;
//!
//!     let total = dispatcher.wait().await;
//!     println!("completed so far: {total}");
//!
//!     dispatcher.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Task dispatch core (queue, worker pool, barrier, aggregator)
pub mod dispatch;
/// Error types
pub mod error;
/// In-memory message store
pub mod store;
/// Core types and events
pub mod types;

pub use config::{Config, DispatchConfig, FetchConfig, QueueFullPolicy};
pub use dispatch::{
    CompletionAggregator, CompletionBarrier, Dispatcher, HttpTaskExecutor, IntakeQueue,
    TaskExecutor,
};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use store::MessageStore;
pub use types::{DispatchStats, Event, Message, MessageId, NewMessage, RunRequest, Task};

/// Resolve once the process receives a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Used as the graceful-shutdown trigger for [`api::start_api_server`].
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration can fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

/// Resolve once the process receives Ctrl+C.
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
