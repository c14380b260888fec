//! Application state for the API server

use crate::{Dispatcher, MessageStore};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request; both fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    /// Task dispatcher (queue, workers, barrier, aggregator)
    pub dispatcher: Dispatcher,

    /// Message records
    pub store: Arc<MessageStore>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(dispatcher: Dispatcher, store: Arc<MessageStore>) -> Self {
        Self { dispatcher, store }
    }
}
