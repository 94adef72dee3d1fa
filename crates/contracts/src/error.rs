//! Layered error definitions
//!
//! Categorized by source: config / channel / delivery / callback / store

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Channel Errors =====
    /// Channel is closed or was never opened
    #[error("channel closed on cluster '{cluster}': {message}")]
    ChannelClosed { cluster: String, message: String },

    /// Consume registration error
    #[error("consume error on queue '{queue_code}': {message}")]
    Consume { queue_code: String, message: String },

    /// Acknowledgment error
    #[error("ack error on cluster '{cluster}' for tag {delivery_tag}: {message}")]
    Ack {
        cluster: String,
        delivery_tag: u64,
        message: String,
    },

    // ===== Delivery Errors =====
    /// Body decode error
    #[error("body decode error for message '{message_id}': {message}")]
    BodyDecode { message_id: String, message: String },

    // ===== Callback Errors =====
    /// Callback invocation error
    #[error("callback '{callback_key}' invocation error: {message}")]
    Callback {
        callback_key: String,
        message: String,
    },

    // ===== Store Errors =====
    /// Store write error
    #[error("store '{store_name}' write error: {message}")]
    StoreWrite { store_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create channel closed error
    pub fn channel_closed(cluster: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChannelClosed {
            cluster: cluster.into(),
            message: message.into(),
        }
    }

    /// Create body decode error
    pub fn body_decode(message_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BodyDecode {
            message_id: message_id.into(),
            message: message.into(),
        }
    }

    /// Create callback invocation error
    pub fn callback(callback_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Callback {
            callback_key: callback_key.into(),
            message: message.into(),
        }
    }

    /// Create store write error
    pub fn store_write(store_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreWrite {
            store_name: store_name.into(),
            message: message.into(),
        }
    }
}
