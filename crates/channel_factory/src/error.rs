//! Channel Factory error types

use contracts::ContractError;
use thiserror::Error;

/// Channel Factory specific error
#[derive(Debug, Error)]
pub enum ChannelFactoryError {
    /// Cluster connection error
    #[error("failed to connect to cluster '{cluster}': {message}")]
    ConnectionFailed { cluster: String, message: String },

    /// Channel open error
    #[error("failed to open channel on cluster '{cluster}': {message}")]
    ChannelOpenFailed { cluster: String, message: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ChannelFactoryError {
    /// Create cluster connection error
    pub fn connection_failed(cluster: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            cluster: cluster.into(),
            message: message.into(),
        }
    }

    /// Create channel open error
    pub fn channel_open(cluster: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChannelOpenFailed {
            cluster: cluster.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ChannelFactoryError>;
