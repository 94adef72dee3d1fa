//! In-process broker implementation
//!
//! Implements `ClusterChannel` and `ChannelFactory` over two in-memory
//! clusters. Used for demos and e2e tests without a broker deployment.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use contracts::{
    BrokerConfig, ClusterChannel, ClusterTag, ContractError, DeliveryCallback, RawDelivery,
    ShutdownCallback,
};
use tracing::{debug, trace};

use crate::error::Result;
use crate::factory::ChannelFactory;

/// One message published to a cluster queue
#[derive(Debug, Clone)]
pub struct Publication {
    /// Broker message id
    pub message_id: String,

    /// Business correlation id
    pub correlation_id: String,

    /// Serialized text payload
    pub body: Bytes,
}

type DeliverFn = Arc<dyn Fn(Publication) + Send + Sync>;

#[derive(Default)]
struct QueueState {
    backlog: VecDeque<Publication>,
    consumer: Option<(u64, DeliverFn)>,
}

/// One in-memory cluster: named queues with backlogs
struct LocalCluster {
    tag: ClusterTag,
    queues: Mutex<HashMap<String, QueueState>>,
}

impl LocalCluster {
    fn new(tag: ClusterTag) -> Self {
        Self {
            tag,
            queues: Mutex::new(HashMap::new()),
        }
    }

    fn publish(&self, queue_code: &str, publication: Publication) {
        // Resolve the consumer under the lock, deliver outside it
        let deliver = {
            let mut queues = self.queues.lock().unwrap();
            let state = queues.entry(queue_code.to_string()).or_default();
            match state.consumer.as_ref() {
                Some((_, deliver)) => deliver.clone(),
                None => {
                    trace!(cluster = %self.tag, queue_code, "no consumer, queued");
                    state.backlog.push_back(publication);
                    return;
                }
            }
        };
        deliver(publication);
    }

    /// Register a consumer and hand back the backlog for delivery
    fn register_consumer(
        &self,
        queue_code: &str,
        channel_id: u64,
        deliver: DeliverFn,
    ) -> Vec<Publication> {
        let mut queues = self.queues.lock().unwrap();
        let state = queues.entry(queue_code.to_string()).or_default();
        state.consumer = Some((channel_id, deliver));
        state.backlog.drain(..).collect()
    }

    fn deregister_channel(&self, channel_id: u64) {
        let mut queues = self.queues.lock().unwrap();
        for state in queues.values_mut() {
            if state
                .consumer
                .as_ref()
                .is_some_and(|(id, _)| *id == channel_id)
            {
                state.consumer = None;
            }
        }
    }

    fn queue_depth(&self, queue_code: &str) -> usize {
        self.queues
            .lock()
            .unwrap()
            .get(queue_code)
            .map(|state| state.backlog.len())
            .unwrap_or(0)
    }
}

/// Channel state shared with delivery closures
struct ChannelState {
    cluster: ClusterTag,
    open: AtomicBool,
    next_tag: AtomicU64,
    unacked: Mutex<BTreeMap<u64, String>>,
    acked: AtomicU64,
    shutdown: Mutex<Vec<ShutdownCallback>>,
}

/// Channel bound to one local cluster
///
/// Delivery tags are numbered per channel, starting at 1.
pub struct LocalChannel {
    channel_id: u64,
    cluster_queues: Arc<LocalCluster>,
    state: Arc<ChannelState>,
}

impl LocalChannel {
    fn new(channel_id: u64, cluster_queues: Arc<LocalCluster>) -> Self {
        let cluster = cluster_queues.tag;
        Self {
            channel_id,
            cluster_queues,
            state: Arc::new(ChannelState {
                cluster,
                open: AtomicBool::new(true),
                next_tag: AtomicU64::new(0),
                unacked: Mutex::new(BTreeMap::new()),
                acked: AtomicU64::new(0),
                shutdown: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Total deliveries acknowledged on this channel
    pub fn acked_count(&self) -> u64 {
        self.state.acked.load(Ordering::Relaxed)
    }

    /// Deliveries awaiting acknowledgment
    pub fn unacked_count(&self) -> usize {
        self.state.unacked.lock().unwrap().len()
    }
}

impl ClusterChannel for LocalChannel {
    fn cluster(&self) -> ClusterTag {
        self.state.cluster
    }

    fn consume(
        &self,
        queue_code: &str,
        manual_ack: bool,
        callback: DeliveryCallback,
    ) -> std::result::Result<(), ContractError> {
        if !self.state.open.load(Ordering::SeqCst) {
            return Err(ContractError::channel_closed(
                self.state.cluster.as_str(),
                "consume on closed channel",
            ));
        }

        let state = Arc::clone(&self.state);
        let deliver: DeliverFn = Arc::new(move |publication: Publication| {
            if !state.open.load(Ordering::Relaxed) {
                return;
            }

            let delivery_tag = state.next_tag.fetch_add(1, Ordering::SeqCst) + 1;
            if manual_ack {
                state
                    .unacked
                    .lock()
                    .unwrap()
                    .insert(delivery_tag, publication.message_id.clone());
            }

            trace!(
                cluster = %state.cluster,
                delivery_tag,
                message_id = %publication.message_id,
                "delivering"
            );

            callback(RawDelivery {
                delivery_tag,
                message_id: publication.message_id,
                correlation_id: publication.correlation_id,
                origin: state.cluster,
                body: publication.body,
            });
        });

        let backlog =
            self.cluster_queues
                .register_consumer(queue_code, self.channel_id, deliver.clone());

        debug!(
            cluster = %self.state.cluster,
            queue_code,
            backlog = backlog.len(),
            "consumer registered"
        );

        for publication in backlog {
            deliver(publication);
        }

        Ok(())
    }

    fn ack(&self, delivery_tag: u64, multiple: bool) -> std::result::Result<(), ContractError> {
        if !self.state.open.load(Ordering::SeqCst) {
            return Err(ContractError::channel_closed(
                self.state.cluster.as_str(),
                "ack on closed channel",
            ));
        }

        let removed = {
            let mut unacked = self.state.unacked.lock().unwrap();
            if multiple {
                let tags: Vec<u64> = unacked.range(..=delivery_tag).map(|(tag, _)| *tag).collect();
                for tag in &tags {
                    unacked.remove(tag);
                }
                tags.len() as u64
            } else if unacked.remove(&delivery_tag).is_some() {
                1
            } else {
                0
            }
        };

        if removed == 0 {
            return Err(ContractError::Ack {
                cluster: self.state.cluster.as_str().to_string(),
                delivery_tag,
                message: "unknown delivery tag".to_string(),
            });
        }

        self.state.acked.fetch_add(removed, Ordering::Relaxed);
        Ok(())
    }

    fn on_shutdown(&self, callback: ShutdownCallback) {
        if self.state.open.load(Ordering::SeqCst) {
            self.state.shutdown.lock().unwrap().push(callback);
        }
    }

    fn close(&self) -> std::result::Result<(), ContractError> {
        if self.state.open.swap(false, Ordering::SeqCst) {
            self.cluster_queues.deregister_channel(self.channel_id);

            let listeners = std::mem::take(&mut *self.state.shutdown.lock().unwrap());
            for listener in listeners {
                listener("channel closed");
            }

            debug!(cluster = %self.state.cluster, channel_id = self.channel_id, "channel closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.open.load(Ordering::SeqCst)
    }
}

struct BrokerInner {
    master: Arc<LocalCluster>,
    slave: Arc<LocalCluster>,
    next_channel_id: AtomicU64,
}

/// In-process two-cluster broker
///
/// Cheap to clone; all clones share the same queues.
#[derive(Clone)]
pub struct LocalBroker {
    inner: Arc<BrokerInner>,
}

impl LocalBroker {
    /// Create a broker with empty master and slave clusters
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BrokerInner {
                master: Arc::new(LocalCluster::new(ClusterTag::Master)),
                slave: Arc::new(LocalCluster::new(ClusterTag::Slave)),
                // Start at 100 so channel ids stand out in logs
                next_channel_id: AtomicU64::new(100),
            }),
        }
    }

    fn cluster(&self, tag: ClusterTag) -> &Arc<LocalCluster> {
        match tag {
            ClusterTag::Master => &self.inner.master,
            ClusterTag::Slave => &self.inner.slave,
        }
    }

    /// Publish one message to a cluster queue
    ///
    /// Delivered immediately if the queue has a consumer, queued otherwise.
    pub fn publish(&self, cluster: ClusterTag, queue_code: &str, publication: Publication) {
        self.cluster(cluster).publish(queue_code, publication);
    }

    /// Backlog depth of a queue (undelivered messages)
    pub fn queue_depth(&self, cluster: ClusterTag, queue_code: &str) -> usize {
        self.cluster(cluster).queue_depth(queue_code)
    }

    /// Open a channel bound to one cluster
    pub fn open_channel(&self, cluster: ClusterTag) -> Arc<LocalChannel> {
        let channel_id = self.inner.next_channel_id.fetch_add(1, Ordering::SeqCst);
        Arc::new(LocalChannel::new(channel_id, Arc::clone(self.cluster(cluster))))
    }
}

impl Default for LocalBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelFactory for LocalBroker {
    async fn create_channel(
        &self,
        cluster: ClusterTag,
        config: &BrokerConfig,
    ) -> Result<Arc<dyn ClusterChannel>> {
        // An in-process broker has no endpoint to dial
        let _ = config;
        Ok(self.open_channel(cluster))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn publication(id: &str) -> Publication {
        Publication {
            message_id: id.to_string(),
            correlation_id: format!("biz-{id}"),
            body: Bytes::from_static(b"\"hello\""),
        }
    }

    #[test]
    fn backlog_delivered_on_consume() {
        let broker = LocalBroker::new();
        broker.publish(ClusterTag::Master, "orders", publication("m1"));
        broker.publish(ClusterTag::Master, "orders", publication("m2"));
        assert_eq!(broker.queue_depth(ClusterTag::Master, "orders"), 2);

        let channel = broker.open_channel(ClusterTag::Master);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        channel
            .consume(
                "orders",
                true,
                Arc::new(move |delivery| {
                    seen_clone.lock().unwrap().push(delivery.message_id);
                }),
            )
            .unwrap();

        assert_eq!(broker.queue_depth(ClusterTag::Master, "orders"), 0);
        assert_eq!(*seen.lock().unwrap(), vec!["m1", "m2"]);
        assert_eq!(channel.unacked_count(), 2);
    }

    #[test]
    fn live_publish_delivers_with_origin() {
        let broker = LocalBroker::new();
        let channel = broker.open_channel(ClusterTag::Slave);

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        channel
            .consume(
                "orders",
                true,
                Arc::new(move |delivery| {
                    assert_eq!(delivery.origin, ClusterTag::Slave);
                    assert_eq!(delivery.delivery_tag, 1);
                    count_clone.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        broker.publish(ClusterTag::Slave, "orders", publication("m1"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ack_single_and_multiple() {
        let broker = LocalBroker::new();
        let channel = broker.open_channel(ClusterTag::Master);
        channel.consume("orders", true, Arc::new(|_| {})).unwrap();

        for i in 0..4 {
            broker.publish(ClusterTag::Master, "orders", publication(&format!("m{i}")));
        }
        assert_eq!(channel.unacked_count(), 4);

        channel.ack(2, false).unwrap();
        assert_eq!(channel.unacked_count(), 3);
        assert_eq!(channel.acked_count(), 1);

        // Multiple ack sweeps everything up to the tag
        channel.ack(3, true).unwrap();
        assert_eq!(channel.unacked_count(), 1);
        assert_eq!(channel.acked_count(), 3);
    }

    #[test]
    fn ack_unknown_tag_is_error() {
        let broker = LocalBroker::new();
        let channel = broker.open_channel(ClusterTag::Master);
        channel.consume("orders", true, Arc::new(|_| {})).unwrap();

        let result = channel.ack(42, false);
        assert!(matches!(result, Err(ContractError::Ack { .. })));
    }

    #[test]
    fn tags_are_channel_scoped() {
        let broker = LocalBroker::new();
        let master = broker.open_channel(ClusterTag::Master);
        let slave = broker.open_channel(ClusterTag::Slave);

        let master_tags = Arc::new(Mutex::new(Vec::new()));
        let slave_tags = Arc::new(Mutex::new(Vec::new()));

        let tags = Arc::clone(&master_tags);
        master
            .consume(
                "orders",
                true,
                Arc::new(move |d| tags.lock().unwrap().push(d.delivery_tag)),
            )
            .unwrap();
        let tags = Arc::clone(&slave_tags);
        slave
            .consume(
                "orders",
                true,
                Arc::new(move |d| tags.lock().unwrap().push(d.delivery_tag)),
            )
            .unwrap();

        broker.publish(ClusterTag::Master, "orders", publication("m1"));
        broker.publish(ClusterTag::Master, "orders", publication("m2"));
        broker.publish(ClusterTag::Slave, "orders", publication("m3"));

        // Each channel numbers its own deliveries from 1
        assert_eq!(*master_tags.lock().unwrap(), vec![1, 2]);
        assert_eq!(*slave_tags.lock().unwrap(), vec![1]);
    }

    #[test]
    fn close_fires_shutdown_and_stops_delivery() {
        let broker = LocalBroker::new();
        let channel = broker.open_channel(ClusterTag::Master);

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        channel
            .consume(
                "orders",
                true,
                Arc::new(move |_| {
                    count_clone.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        channel.on_shutdown(Arc::new(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        channel.close().unwrap();
        assert!(!channel.is_open());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Publishes after close queue up instead of delivering
        broker.publish(ClusterTag::Master, "orders", publication("m1"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(broker.queue_depth(ClusterTag::Master, "orders"), 1);

        // Idempotent close, no second listener firing
        channel.close().unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn factory_creates_bound_channels() {
        let broker = LocalBroker::new();
        let config = contracts::BrokerConfig {
            master: contracts::ClusterEndpoint {
                host: "local".into(),
                port: 5672,
                vhost: "/".into(),
            },
            slave: contracts::ClusterEndpoint {
                host: "local".into(),
                port: 5672,
                vhost: "/".into(),
            },
        };

        let channel = broker
            .create_channel(ClusterTag::Slave, &config)
            .await
            .unwrap();
        assert_eq!(channel.cluster(), ClusterTag::Slave);
        assert!(channel.is_open());
    }
}
