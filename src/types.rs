//! Core types for task-dispatch

use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

/// One unit of dispatched work
///
/// Every field defaults to its zero value, so `{}` is a valid (no-op) task.
/// The `id` is opaque: it only shows up in logs and events and may repeat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    /// Caller-assigned identifier (not a dedup key)
    pub id: i64,

    /// Free-form task kind label, not interpreted by the dispatcher
    #[serde(rename = "task")]
    pub kind: String,

    /// URL to fetch; empty means no fetch
    pub url: String,

    /// Pause in whole seconds; zero or negative means no pause
    pub sleep_duration: i64,
}

impl Task {
    /// URL to fetch, if any
    pub fn fetch_url(&self) -> Option<&str> {
        if self.url.is_empty() {
            None
        } else {
            Some(&self.url)
        }
    }

    /// Pause to take after the fetch, if any
    pub fn pause(&self) -> Option<Duration> {
        u64::try_from(self.sleep_duration)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Request body for `POST /run/`
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RunRequest {
    /// Task template; `count` copies are queued
    pub task: Task,

    /// Number of copies to queue; zero or negative queues nothing
    pub count: i64,
}

/// Unique identifier for a stored message
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MessageId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A stored message record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    /// Store-assigned identifier
    pub id: MessageId,
    /// Free-form message text
    pub message: String,
    /// Attached task description (stored, never dispatched)
    pub task: Task,
}

/// Request body for `POST /messages/`
///
/// Any `id` in the body is ignored; the store assigns one.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NewMessage {
    /// Free-form message text
    pub message: String,
    /// Attached task description
    pub task: Task,
}

/// Simple `{"status": ...}` acknowledgement body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Human-readable status
    pub status: String,
}

impl StatusResponse {
    /// Build a status body from any string-like value
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

/// Response body for `GET /count/`
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    /// Completed-total as last published by the aggregator
    #[serde(rename = "taskCounter")]
    pub task_counter: u64,
}

/// Snapshot of dispatcher state for `GET /stats`
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DispatchStats {
    /// Tasks accepted but not yet finished (queued or executing)
    pub outstanding: usize,
    /// Completed-total
    pub completed: u64,
    /// Tasks currently sitting in the intake queue
    pub queued: usize,
    /// Fixed intake queue capacity
    pub queue_capacity: usize,
    /// Configured worker pool size
    pub worker_count: usize,
    /// Whether new submissions are accepted
    pub accepting_new: bool,
}

/// Event emitted during the task lifecycle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Task accepted into the intake queue
    TaskQueued {
        /// Task ID (opaque, may repeat)
        id: i64,
    },

    /// Task dequeued by a worker and launched
    TaskStarted {
        /// Task ID (opaque, may repeat)
        id: i64,
    },

    /// Task execution returned
    TaskCompleted {
        /// Task ID (opaque, may repeat)
        id: i64,
    },

    /// Outstanding work reached zero for a waiter
    Drained {
        /// Completed-total at the time of the drain
        completed: u64,
    },

    /// Dispatcher is shutting down
    Shutdown,
}
