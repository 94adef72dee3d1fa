//! LogDispatcher - logs callback messages via tracing
//!
//! Stands in for the subscriber-facing HTTP invoker in demo and test runs.

use contracts::{CallbackDispatcher, CallbackMessage, ContractError};
use tracing::info;

/// Dispatcher that logs each callback message
pub struct LogDispatcher {
    name: String,
}

impl LogDispatcher {
    /// Create a new LogDispatcher with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl CallbackDispatcher for LogDispatcher {
    fn invoke(&self, message: &CallbackMessage) -> Result<(), ContractError> {
        info!(
            dispatcher = %self.name,
            app_id = %message.app_id,
            queue_code = %message.queue_code,
            callback_key = %message.callback_key,
            message_id = %message.id,
            biz_id = %message.biz_id,
            body_len = message.body.len(),
            "callback invoked"
        );
        Ok(())
    }
}
