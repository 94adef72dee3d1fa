//! Dispatch error types

use thiserror::Error;

/// Dispatch-specific errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Store creation error
    #[error("failed to create store '{name}': {message}")]
    StoreCreation { name: String, message: String },

    /// Store error (from contract)
    #[error("store error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatchError {
    /// Create a store creation error
    pub fn store_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
