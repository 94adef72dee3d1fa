//! MemoryStore - bounded in-memory store

use std::collections::HashMap;
use std::sync::Mutex;

use contracts::{ContractError, Message, MessageStore};
use tracing::{debug, instrument, trace};

/// In-memory store with an optional capacity bound
///
/// Used by tests and demos; contents are inspectable.
pub struct MemoryStore {
    name: String,
    capacity: usize,
    messages: Mutex<Vec<Message>>,
}

impl MemoryStore {
    /// Create a store; capacity 0 = unbounded
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Create from params map (for factory)
    pub fn from_params(name: impl Into<String>, params: &HashMap<String, String>) -> Self {
        let capacity = params
            .get("capacity")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        Self::new(name, capacity)
    }

    /// Stored messages
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    /// Stored message count
    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MessageStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "memory_store_write",
        skip(self, message),
        fields(store = %self.name, message_id = %message.id)
    )]
    async fn write(&self, message: &Message) -> Result<bool, ContractError> {
        let mut messages = self.messages.lock().unwrap();
        if self.capacity > 0 && messages.len() >= self.capacity {
            debug!(store = %self.name, capacity = self.capacity, "store full, rejecting write");
            return Ok(false);
        }

        messages.push(message.clone());
        trace!(store = %self.name, stored = messages.len(), "message stored");
        Ok(true)
    }
}
