//! In-memory message store
//!
//! A plain map behind one coarse async mutex. Every create, read, and delete
//! takes the same lock; this store is not on the task dispatch path.

use crate::types::{Message, MessageId, NewMessage};
use std::collections::HashMap;
use tokio::sync::Mutex;

struct StoreInner {
    messages: HashMap<MessageId, Message>,
    next_id: i64,
}

/// Keyed record store with store-assigned, strictly increasing ids
pub struct MessageStore {
    inner: Mutex<StoreInner>,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    /// Create an empty store; the first id handed out is 1
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                messages: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Store a new message under a fresh id and return the stored record
    pub async fn create(&self, new: NewMessage) -> Message {
        let mut inner = self.inner.lock().await;

        let id = MessageId(inner.next_id);
        inner.next_id += 1;

        let message = Message {
            id,
            message: new.message,
            task: new.task,
        };
        inner.messages.insert(id, message.clone());

        tracing::debug!(message_id = id.0, "Message stored");
        message
    }

    /// Look up a message by id
    pub async fn get(&self, id: MessageId) -> Option<Message> {
        self.inner.lock().await.messages.get(&id).cloned()
    }

    /// Remove a message, returning it if it existed
    pub async fn delete(&self, id: MessageId) -> Option<Message> {
        let removed = self.inner.lock().await.messages.remove(&id);
        if removed.is_some() {
            tracing::debug!(message_id = id.0, "Message deleted");
        }
        removed
    }

    /// Number of stored messages
    pub async fn len(&self) -> usize {
        self.inner.lock().await.messages.len()
    }

    /// Whether the store holds no messages
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
