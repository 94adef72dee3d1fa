//! CallbackMessage - normalized, broker-independent delivery
//!
//! Built once per successful delivery and handed to the dispatcher that
//! drives the subscriber-facing callback.

use crate::ContractError;

/// Normalized callback message
///
/// Immutable after construction; owned by the delivery handler that built it
/// until handed to the [`CallbackDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackMessage {
    /// Application id
    pub app_id: String,

    /// Queue code
    pub queue_code: String,

    /// Callback endpoint key
    pub callback_key: String,

    /// Broker message id
    pub id: String,

    /// Business correlation id
    pub biz_id: String,

    /// Decoded text payload
    pub body: String,
}

/// Subscriber-facing dispatch trait
///
/// Invokes the callback endpoint identified by `callback_key` for one
/// message. May fail; the delivery handler must not let that failure escape.
pub trait CallbackDispatcher: Send + Sync {
    /// Invoke the callback for a message
    ///
    /// # Errors
    /// Returns invocation error (should include context)
    fn invoke(&self, message: &CallbackMessage) -> Result<(), ContractError>;
}
