//! Message - ingress-side persistence unit

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Producer-facing message persisted by the dispatch pipeline
///
/// Treated as an opaque payload plus routing metadata; the storage tiers own
/// how it is laid out at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Broker message id
    pub id: String,

    /// Application id
    pub app_id: String,

    /// Queue code
    pub queue_code: String,

    /// Business correlation id
    pub biz_id: String,

    /// Opaque payload
    pub body: Bytes,
}
