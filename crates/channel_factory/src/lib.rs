//! # Channel Factory
//!
//! Broker channel acquisition module.
//!
//! Responsibilities:
//! - Create `ClusterChannel` instances keyed by cluster identity
//! - Own reconnection policy (the consumer never retries on its own)
//! - Provide an in-process `LocalBroker` for demos and e2e tests
//! - Provide scriptable mocks with failure injection for unit tests

pub mod error;
pub mod factory;
pub mod local_broker;
pub mod mock_channel;

pub use contracts::{BrokerConfig, ClusterChannel, ClusterTag};
pub use error::{ChannelFactoryError, Result};
pub use factory::ChannelFactory;
pub use local_broker::{LocalBroker, Publication};
pub use mock_channel::{MockChannel, MockChannelFactory, MockConfig};
