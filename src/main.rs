//! task-dispatch server binary.
//!
//! Loads configuration from the environment (and an optional JSON file named
//! by `TASK_DISPATCH_CONFIG`), starts the dispatcher, and serves the REST API
//! until SIGTERM/SIGINT.

use anyhow::Context;
use std::sync::Arc;
use task_dispatch::{Config, Dispatcher, MessageStore};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("task_dispatch=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!(
        bind_address = %config.server.api.bind_address,
        workers = config.dispatch.worker_count,
        queue_capacity = config.dispatch.queue_capacity,
        "Configuration loaded"
    );

    let dispatcher = Dispatcher::new(config.clone())
        .await
        .context("failed to start dispatcher")?;
    let store = Arc::new(MessageStore::new());

    task_dispatch::api::start_api_server(dispatcher, store, Arc::new(config))
        .await
        .context("API server failed")?;

    Ok(())
}
