//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`tasks`] - Task submission, drain and counters
//! - [`messages`] - Message record CRUD
//! - [`system`] - Health, events, OpenAPI

use crate::error::{Error, Result};
use crate::types::MessageId;
use serde::de::DeserializeOwned;

mod messages;
mod system;
mod tasks;

// Re-export all handlers so `routes::function_name` works
pub use messages::*;
pub use system::*;
pub use tasks::*;

/// Decode a JSON request body whatever its `Content-Type`
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::InvalidRequest(format!("malformed body: {e}")))
}

/// Parse a message id path segment
pub(crate) fn parse_message_id(raw: &str) -> Result<MessageId> {
    raw.parse()
        .map_err(|_| Error::InvalidRequest(format!("message id must be an integer, got {raw:?}")))
}
