//! Broker client abstraction
//!
//! Defines the trait for acquiring broker channels, supporting in-process
//! implementations and mock testing.

use std::future::Future;
use std::sync::Arc;

use contracts::{BrokerConfig, ClusterChannel, ClusterTag};

use crate::error::Result;

/// Channel factory trait
///
/// Abstracts channel acquisition for testing and implementation replacement.
/// Reconnection policy lives behind this trait; consumers request a channel
/// once per cluster and never retry on their own.
pub trait ChannelFactory: Send + Sync {
    /// Create a channel bound to one cluster
    ///
    /// # Arguments
    /// * `cluster` - Target cluster identity
    /// * `config` - Broker configuration value object
    ///
    /// # Errors
    /// Fails if the cluster is unreachable or refuses the channel.
    fn create_channel(
        &self,
        cluster: ClusterTag,
        config: &BrokerConfig,
    ) -> impl Future<Output = Result<Arc<dyn ClusterChannel>>> + Send;
}
