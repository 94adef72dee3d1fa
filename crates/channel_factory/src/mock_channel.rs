//! Mock broker channel
//!
//! Scriptable `ClusterChannel` for unit tests: deliveries are pushed by the
//! test, acknowledgments are recorded, and failures can be injected.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use contracts::{
    BrokerConfig, ClusterChannel, ClusterTag, ContractError, DeliveryCallback, RawDelivery,
    ShutdownCallback,
};
use tracing::instrument;

use crate::error::{ChannelFactoryError, Result};
use crate::factory::ChannelFactory;

/// Mock factory configuration
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    /// Clusters whose channel creation should fail
    pub fail_create: Vec<ClusterTag>,
    /// Clusters whose consume registration should fail
    pub fail_consume: Vec<ClusterTag>,
    /// Make every ack fail
    pub fail_ack: bool,
}

/// Scriptable mock channel
pub struct MockChannel {
    cluster: ClusterTag,
    open: AtomicBool,
    fail_consume: bool,
    fail_ack: bool,
    consumed: Mutex<Vec<(String, bool)>>,
    callback: Mutex<Option<DeliveryCallback>>,
    acks: Mutex<Vec<(u64, bool)>>,
    shutdown: Mutex<Vec<ShutdownCallback>>,
}

impl MockChannel {
    /// Create an open mock channel for a cluster
    pub fn new(cluster: ClusterTag) -> Self {
        Self::with_failures(cluster, false, false)
    }

    fn with_failures(cluster: ClusterTag, fail_consume: bool, fail_ack: bool) -> Self {
        Self {
            cluster,
            open: AtomicBool::new(true),
            fail_consume,
            fail_ack,
            consumed: Mutex::new(Vec::new()),
            callback: Mutex::new(None),
            acks: Mutex::new(Vec::new()),
            shutdown: Mutex::new(Vec::new()),
        }
    }

    /// Push one delivery into the registered callback
    ///
    /// Returns false if no consumer is registered.
    pub fn deliver(&self, delivery: RawDelivery) -> bool {
        let callback = self.callback.lock().unwrap().clone();
        match callback {
            Some(callback) => {
                callback(delivery);
                true
            }
            None => false,
        }
    }

    /// Fire registered shutdown listeners (simulates broker-side closure)
    pub fn fire_shutdown(&self, reason: &str) {
        let listeners = self.shutdown.lock().unwrap().clone();
        for listener in listeners {
            listener(reason);
        }
    }

    /// Recorded acks as (delivery_tag, multiple) pairs
    pub fn acks(&self) -> Vec<(u64, bool)> {
        self.acks.lock().unwrap().clone()
    }

    /// Queues this channel was asked to consume
    pub fn consumed_queues(&self) -> Vec<String> {
        self.consumed
            .lock()
            .unwrap()
            .iter()
            .map(|(queue, _)| queue.clone())
            .collect()
    }

    /// Number of registered shutdown listeners
    pub fn shutdown_listener_count(&self) -> usize {
        self.shutdown.lock().unwrap().len()
    }
}

impl ClusterChannel for MockChannel {
    fn cluster(&self) -> ClusterTag {
        self.cluster
    }

    fn consume(
        &self,
        queue_code: &str,
        manual_ack: bool,
        callback: DeliveryCallback,
    ) -> std::result::Result<(), ContractError> {
        if self.fail_consume {
            return Err(ContractError::Consume {
                queue_code: queue_code.to_string(),
                message: "injected consume failure".to_string(),
            });
        }
        if !self.open.load(Ordering::SeqCst) {
            return Err(ContractError::channel_closed(
                self.cluster.as_str(),
                "consume on closed channel",
            ));
        }

        self.consumed
            .lock()
            .unwrap()
            .push((queue_code.to_string(), manual_ack));
        *self.callback.lock().unwrap() = Some(callback);
        Ok(())
    }

    fn ack(&self, delivery_tag: u64, multiple: bool) -> std::result::Result<(), ContractError> {
        if self.fail_ack {
            return Err(ContractError::Ack {
                cluster: self.cluster.as_str().to_string(),
                delivery_tag,
                message: "injected ack failure".to_string(),
            });
        }
        self.acks.lock().unwrap().push((delivery_tag, multiple));
        Ok(())
    }

    fn on_shutdown(&self, callback: ShutdownCallback) {
        self.shutdown.lock().unwrap().push(callback);
    }

    fn close(&self) -> std::result::Result<(), ContractError> {
        if self.open.swap(false, Ordering::SeqCst) {
            self.fire_shutdown("channel closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Mock channel factory
///
/// Pre-creates one channel per cluster so tests can hold direct references
/// to what the consumer under test receives.
pub struct MockChannelFactory {
    config: MockConfig,
    master: Arc<MockChannel>,
    slave: Arc<MockChannel>,
    create_calls: AtomicUsize,
}

impl MockChannelFactory {
    /// Create default mock factory
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create mock factory with failure injection
    pub fn with_config(config: MockConfig) -> Self {
        let master = Arc::new(MockChannel::with_failures(
            ClusterTag::Master,
            config.fail_consume.contains(&ClusterTag::Master),
            config.fail_ack,
        ));
        let slave = Arc::new(MockChannel::with_failures(
            ClusterTag::Slave,
            config.fail_consume.contains(&ClusterTag::Slave),
            config.fail_ack,
        ));
        Self {
            config,
            master,
            slave,
            create_calls: AtomicUsize::new(0),
        }
    }

    /// The channel handed out for a cluster
    pub fn channel(&self, cluster: ClusterTag) -> Arc<MockChannel> {
        match cluster {
            ClusterTag::Master => Arc::clone(&self.master),
            ClusterTag::Slave => Arc::clone(&self.slave),
        }
    }

    /// How many channels were requested
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockChannelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelFactory for MockChannelFactory {
    #[instrument(name = "mock_create_channel", skip(self, config), fields(cluster = %cluster))]
    async fn create_channel(
        &self,
        cluster: ClusterTag,
        config: &BrokerConfig,
    ) -> Result<Arc<dyn ClusterChannel>> {
        let _ = config;
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.config.fail_create.contains(&cluster) {
            return Err(ChannelFactoryError::connection_failed(
                cluster.as_str(),
                "injected connection failure",
            ));
        }

        Ok(self.channel(cluster))
    }
}
