//! RawDelivery - one broker delivery as handed to a consumer callback

use std::sync::Arc;

use bytes::Bytes;

use crate::ClusterTag;

/// Delivery callback type
///
/// When a channel delivers a message, it sends a `RawDelivery` through this
/// callback. Uses `Arc` to allow callback sharing across multiple contexts.
pub type DeliveryCallback = Arc<dyn Fn(RawDelivery) + Send + Sync>;

/// One raw delivery from a broker channel
///
/// The delivery tag is scoped to the channel that produced it and is never
/// valid on another channel.
#[derive(Debug, Clone)]
pub struct RawDelivery {
    /// Channel-scoped delivery tag
    pub delivery_tag: u64,

    /// Broker message id
    pub message_id: String,

    /// Business correlation id
    pub correlation_id: String,

    /// Cluster-origin tag carried on delivery metadata
    pub origin: ClusterTag,

    /// Serialized text payload
    pub body: Bytes,
}
