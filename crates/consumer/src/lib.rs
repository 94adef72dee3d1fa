//! # Broker Consumer
//!
//! Dual-cluster queue consumption module.
//!
//! Responsibilities:
//! - Open one channel per cluster for a logical queue and supervise both
//! - Normalize each raw delivery into a `CallbackMessage`
//! - Hand the message to the `CallbackDispatcher`
//! - Acknowledge every delivery exactly once, on the channel matching its
//!   cluster-origin tag
//!
//! ## Usage Example
//!
//! ```ignore
//! use consumer::{BrokerConsumer, LogDispatcher};
//! use std::sync::Arc;
//!
//! let consumer = BrokerConsumer::new(
//!     "trade",
//!     "trade_order_created",
//!     "cb_order_created",
//!     broker_config,
//!     Arc::new(factory),
//!     Arc::new(LogDispatcher::new("demo")),
//! );
//! consumer.start().await;
//! // ... later ...
//! consumer.stop();
//! ```
//!
//! Delivery processing is commit-then-process: a delivery is acknowledged
//! whether or not its callback succeeded, an explicit at-most-once contract.

mod consumer;
mod dispatchers;
mod error;
mod metrics;
mod routing;

pub use consumer::BrokerConsumer;
pub use contracts::{CallbackDispatcher, CallbackMessage, RawDelivery};
pub use dispatchers::LogDispatcher;
pub use error::{ConsumerError, Result};
pub use metrics::{ConsumerMetrics, MetricsSnapshot};
pub use routing::ChannelPair;
