//! ClusterChannel trait - broker channel abstraction
//!
//! Defines a unified interface for broker channels, decoupling the consumer
//! from concrete broker clients. Supports unified handling of in-process and
//! real broker channels.

use std::sync::Arc;

use crate::{ClusterTag, ContractError, DeliveryCallback};

/// Shutdown listener type
///
/// Invoked with a human-readable reason when the channel closes, expectedly
/// or not.
pub type ShutdownCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Broker channel trait
///
/// Abstracts one channel bound to one broker cluster. A consumer owns
/// exactly two of these, one per cluster, both consuming the same logical
/// queue.
///
/// # Example
///
/// ```ignore
/// let channel: Arc<dyn ClusterChannel> = factory.create_channel(tag, &config).await?;
/// channel.consume("orders", true, Arc::new(|delivery| {
///     println!("delivery {} from {}", delivery.delivery_tag, delivery.origin);
/// }))?;
/// // ... later ...
/// channel.close()?;
/// ```
pub trait ClusterChannel: Send + Sync {
    /// Cluster this channel is bound to
    fn cluster(&self) -> ClusterTag;

    /// Begin consuming a queue
    ///
    /// With `manual_ack` set, the broker holds each delivery until
    /// [`ClusterChannel::ack`] is called with its tag. Deliveries arrive on
    /// an execution context supplied by the broker client; the callback must
    /// tolerate concurrent invocation relative to other channels.
    ///
    /// # Errors
    /// Returns an error if the channel is closed or the subscription is
    /// rejected by the broker.
    fn consume(
        &self,
        queue_code: &str,
        manual_ack: bool,
        callback: DeliveryCallback,
    ) -> Result<(), ContractError>;

    /// Acknowledge one delivery by tag
    ///
    /// `multiple` acknowledges every outstanding delivery up to and
    /// including `delivery_tag`. Tags from another channel are invalid here.
    fn ack(&self, delivery_tag: u64, multiple: bool) -> Result<(), ContractError>;

    /// Register a shutdown listener
    ///
    /// Listeners fire when the channel closes; registration after close is
    /// a no-op.
    fn on_shutdown(&self, callback: ShutdownCallback);

    /// Close the channel and cancel its subscriptions
    fn close(&self) -> Result<(), ContractError>;

    /// Check if the channel is open
    fn is_open(&self) -> bool;
}
