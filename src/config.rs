//! Configuration types for task-dispatch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, time::Duration};
use utoipa::ToSchema;

/// Environment variable naming an optional JSON config file
pub const CONFIG_FILE_ENV: &str = "TASK_DISPATCH_CONFIG";
/// Environment variable overriding `server.api.bind_address`
pub const BIND_ENV: &str = "TASK_DISPATCH_BIND";
/// Environment variable overriding `dispatch.worker_count`
pub const WORKERS_ENV: &str = "TASK_DISPATCH_WORKERS";
/// Environment variable overriding `dispatch.queue_capacity`
pub const QUEUE_CAPACITY_ENV: &str = "TASK_DISPATCH_QUEUE_CAPACITY";

/// What `enqueue` does when the intake queue has no free slot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueueFullPolicy {
    /// Suspend the producer until a worker frees a slot (backpressure)
    #[default]
    Block,
    /// Fail immediately with [`Error::QueueFull`]
    Reject,
}

/// Dispatch core sizing (queue, worker pool, completion channel)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DispatchConfig {
    /// Intake queue capacity in tasks (default: 1000)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Number of workers polling the intake queue (default: 10000)
    ///
    /// Bounds concurrent dequeuing only. Each dequeued task runs in its own
    /// tokio task, so execution concurrency is not limited by this value.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Buffer size of the channel feeding the completion aggregator (default: 1024)
    #[serde(default = "default_completion_channel_capacity")]
    pub completion_channel_capacity: usize,

    /// Behavior when the intake queue is full (default: block)
    #[serde(default)]
    pub queue_full_policy: QueueFullPolicy,

    /// How long shutdown waits for outstanding tasks (default: 30 seconds)
    #[serde(default = "default_shutdown_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub shutdown_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            worker_count: default_worker_count(),
            completion_channel_capacity: default_completion_channel_capacity(),
            queue_full_policy: QueueFullPolicy::default(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// HTTP client settings used by the task executor
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FetchConfig {
    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub timeout: Duration,

    /// User-Agent header sent with every fetch
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for the dispatcher and its HTTP surface
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Queue, worker pool, and completion channel sizing
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Task executor HTTP client settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// API server settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Load a JSON config file; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("invalid config file '{}': {}", path.display(), e),
            key: None,
        })
    }

    /// Build the process configuration from the environment
    ///
    /// Reads the file named by `TASK_DISPATCH_CONFIG` if set, then applies the
    /// individual `TASK_DISPATCH_*` overrides and validates the result.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => {
                tracing::info!(path = %path, "Loading configuration file");
                Self::from_file(path)?
            }
            Err(_) => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TASK_DISPATCH_*` overrides resolved through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(BIND_ENV) {
            self.server.api.bind_address = bind
                .parse()
                .map_err(|e| Error::config(BIND_ENV, format!("invalid socket address '{bind}': {e}")))?;
        }

        if let Some(workers) = lookup(WORKERS_ENV) {
            self.dispatch.worker_count = workers
                .parse()
                .map_err(|e| Error::config(WORKERS_ENV, format!("invalid worker count '{workers}': {e}")))?;
        }

        if let Some(capacity) = lookup(QUEUE_CAPACITY_ENV) {
            self.dispatch.queue_capacity = capacity.parse().map_err(|e| {
                Error::config(
                    QUEUE_CAPACITY_ENV,
                    format!("invalid queue capacity '{capacity}': {e}"),
                )
            })?;
        }

        Ok(())
    }

    /// Reject settings the dispatch core cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.dispatch.queue_capacity == 0 {
            return Err(Error::config(
                "dispatch.queue_capacity",
                "queue capacity must be at least 1",
            ));
        }
        if self.dispatch.worker_count == 0 {
            return Err(Error::config(
                "dispatch.worker_count",
                "worker pool needs at least one worker",
            ));
        }
        if self.dispatch.completion_channel_capacity == 0 {
            return Err(Error::config(
                "dispatch.completion_channel_capacity",
                "completion channel capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_queue_capacity() -> usize {
    1000
}

fn default_worker_count() -> usize {
    10_000
}

fn default_completion_channel_capacity() -> usize {
    1024
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("task-dispatch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
