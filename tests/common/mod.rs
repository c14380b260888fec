//! Common test utilities for task-dispatch integration tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use task_dispatch::{Config, Dispatcher, MessageStore};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A running API server bound to an ephemeral localhost port
pub struct TestServer {
    pub address: SocketAddr,
    pub client: reqwest::Client,
    pub dispatcher: Dispatcher,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<task_dispatch::Result<()>>>,
}

/// Small pool so the server starts quickly
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.dispatch.worker_count = 16;
    config.dispatch.queue_capacity = 32;
    config.dispatch.shutdown_timeout = Duration::from_secs(5);
    config.fetch.timeout = Duration::from_secs(5);
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    config
}

impl TestServer {
    /// Start a server with [`test_config`]
    pub async fn start() -> Self {
        Self::start_with(test_config()).await
    }

    /// Start a server with an explicit configuration
    pub async fn start_with(config: Config) -> Self {
        let dispatcher = Dispatcher::new(config.clone()).await.unwrap();
        let store = Arc::new(MessageStore::new());
        let app = task_dispatch::api::create_router(dispatcher.clone(), store, Arc::new(config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(task_dispatch::api::serve(listener, app, async move {
            stop_rx.await.ok();
        }));

        Self {
            address,
            client: reqwest::Client::new(),
            dispatcher,
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Absolute URL for `path` on this server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    /// Stop accepting connections, then shut the dispatcher down
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            stop.send(()).ok();
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap().unwrap();
        }
        self.dispatcher.shutdown().await.unwrap();
    }
}
