//! LogStore - logs message summary via tracing

use contracts::{ContractError, Message, MessageStore};
use tracing::{info, instrument};

/// Store that logs message summaries for debugging
///
/// Accepts every write.
pub struct LogStore {
    name: String,
}

impl LogStore {
    /// Create a new LogStore with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl MessageStore for LogStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_store_write",
        skip(self, message),
        fields(store = %self.name, message_id = %message.id)
    )]
    async fn write(&self, message: &Message) -> Result<bool, ContractError> {
        info!(
            store = %self.name,
            message_id = %message.id,
            app_id = %message.app_id,
            queue_code = %message.queue_code,
            biz_id = %message.biz_id,
            body_len = message.body.len(),
            "message stored"
        );
        Ok(true)
    }
}
