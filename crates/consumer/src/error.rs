//! Consumer error types

use contracts::ContractError;
use thiserror::Error;

/// Consumer error
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// Channel acquisition failed for one cluster
    #[error("failed to acquire channel on cluster '{cluster}': {message}")]
    ChannelAcquisition { cluster: String, message: String },

    /// Consumer was already started
    #[error("consumer for queue '{queue_code}' already started")]
    AlreadyStarted { queue_code: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Consumer Result type alias
pub type Result<T> = std::result::Result<T, ConsumerError>;
