//! BrokerConsumer - one logical queue, two cluster channels

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use channel_factory::ChannelFactory;
use contracts::{
    BrokerConfig, CallbackDispatcher, CallbackMessage, ClusterTag, ContractError, DeliveryCallback,
    QueueBinding, RawDelivery,
};
use metrics::counter;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{ConsumerError, Result};
use crate::metrics::ConsumerMetrics;
use crate::routing::ChannelPair;

/// Consumer for one logical queue subscription
///
/// Owns one channel per cluster, both consuming the same queue code with
/// manual acknowledgment. The identity triple is immutable for the
/// instance's lifetime; an instance is single-use (`start` once, `stop`
/// once).
pub struct BrokerConsumer<F: ChannelFactory> {
    /// Application id
    app_id: String,

    /// Queue code consumed on both clusters
    queue_code: String,

    /// Callback endpoint key
    callback_key: String,

    /// Broker configuration handed to the factory
    broker_config: BrokerConfig,

    /// Channel factory collaborator
    factory: Arc<F>,

    /// Subscriber-facing dispatch collaborator
    dispatcher: Arc<dyn CallbackDispatcher>,

    /// The two channels, set once at start
    channels: Arc<ChannelPair>,

    /// Shared delivery metrics
    metrics: Arc<ConsumerMetrics>,

    /// Start guard
    started: AtomicBool,
}

impl<F: ChannelFactory> BrokerConsumer<F> {
    /// Create a consumer for one (app id, queue code, callback key) triple
    pub fn new(
        app_id: impl Into<String>,
        queue_code: impl Into<String>,
        callback_key: impl Into<String>,
        broker_config: BrokerConfig,
        factory: Arc<F>,
        dispatcher: Arc<dyn CallbackDispatcher>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            queue_code: queue_code.into(),
            callback_key: callback_key.into(),
            broker_config,
            factory,
            dispatcher,
            channels: Arc::new(ChannelPair::new()),
            metrics: Arc::new(ConsumerMetrics::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Create a consumer from a configured queue binding
    pub fn from_binding(
        binding: &QueueBinding,
        broker_config: BrokerConfig,
        factory: Arc<F>,
        dispatcher: Arc<dyn CallbackDispatcher>,
    ) -> Self {
        Self::new(
            binding.app_id.clone(),
            binding.queue_code.clone(),
            binding.callback_key.clone(),
            broker_config,
            factory,
            dispatcher,
        )
    }

    /// Queue code this consumer is bound to
    pub fn queue_code(&self) -> &str {
        &self.queue_code
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<ConsumerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Start consuming on both clusters
    ///
    /// A second call is rejected: it logs a warning and opens nothing, so a
    /// duplicate channel pair can never leak. Per-side acquisition failure
    /// is logged and leaves that side inactive; reconnection is the
    /// factory's concern.
    #[instrument(
        name = "consumer_start",
        skip(self),
        fields(app_id = %self.app_id, queue_code = %self.queue_code)
    )]
    pub async fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!(queue_code = %self.queue_code, "consumer already started, ignoring");
            return;
        }

        for cluster in [ClusterTag::Master, ClusterTag::Slave] {
            if let Err(e) = self.start_side(cluster).await {
                error!(
                    cluster = %cluster,
                    queue_code = %self.queue_code,
                    error = %e,
                    "channel acquisition failed, side stays inactive"
                );
            }
        }
    }

    async fn start_side(&self, cluster: ClusterTag) -> Result<()> {
        let channel = self
            .factory
            .create_channel(cluster, &self.broker_config)
            .await
            .map_err(|e| ConsumerError::ChannelAcquisition {
                cluster: cluster.as_str().to_string(),
                message: e.to_string(),
            })?;

        let queue_code = self.queue_code.clone();
        channel.on_shutdown(Arc::new(move |reason| {
            error!(cluster = %cluster, queue_code = %queue_code, reason, "channel shutdown");
        }));

        // The slot must be filled before consumption begins so the very
        // first delivery can route its ack.
        self.channels.set(cluster, Arc::clone(&channel));

        channel.consume(&self.queue_code, true, self.delivery_handler())?;

        info!(cluster = %cluster, queue_code = %self.queue_code, "consuming");
        Ok(())
    }

    fn delivery_handler(&self) -> DeliveryCallback {
        let ctx = Arc::new(DeliveryContext {
            app_id: self.app_id.clone(),
            queue_code: self.queue_code.clone(),
            callback_key: self.callback_key.clone(),
            dispatcher: Arc::clone(&self.dispatcher),
            channels: Arc::clone(&self.channels),
            metrics: Arc::clone(&self.metrics),
        });

        Arc::new(move |delivery| ctx.handle(delivery))
    }

    /// Close both channels and cancel both subscriptions
    ///
    /// Safe to call when `start` partially failed or never ran; sides that
    /// never opened are skipped.
    #[instrument(name = "consumer_stop", skip(self), fields(queue_code = %self.queue_code))]
    pub fn stop(&self) {
        for cluster in [ClusterTag::Master, ClusterTag::Slave] {
            if let Some(channel) = self.channels.get(cluster) {
                if let Err(e) = channel.close() {
                    error!(cluster = %cluster, error = %e, "channel close failed");
                }
            }
        }
        info!(queue_code = %self.queue_code, "consumer stopped");
    }
}

/// State shared by the delivery closures of both channels
struct DeliveryContext {
    app_id: String,
    queue_code: String,
    callback_key: String,
    dispatcher: Arc<dyn CallbackDispatcher>,
    channels: Arc<ChannelPair>,
    metrics: Arc<ConsumerMetrics>,
}

impl DeliveryContext {
    /// Handle one delivery: process, then acknowledge unconditionally
    fn handle(&self, delivery: RawDelivery) {
        self.metrics.record_received();
        counter!(
            "mq_dispatcher_deliveries_received_total",
            "cluster" => delivery.origin.as_str(),
            "queue_code" => self.queue_code.clone()
        )
        .increment(1);
        debug!(
            queue_code = %self.queue_code,
            message_id = %delivery.message_id,
            delivery_tag = delivery.delivery_tag,
            origin = %delivery.origin,
            "delivery received"
        );

        if let Err(e) = self.process(&delivery) {
            error!(
                queue_code = %self.queue_code,
                message_id = %delivery.message_id,
                origin = %delivery.origin,
                error = %e,
                "delivery processing failed"
            );
        }

        // Commit-then-process: the delivery is removed from the broker even
        // when processing failed.
        self.acknowledge(&delivery);
    }

    fn process(&self, delivery: &RawDelivery) -> std::result::Result<(), ContractError> {
        let body = decode_body(&delivery.message_id, &delivery.body)
            .inspect_err(|_| self.metrics.record_decode_error())?;

        let message = CallbackMessage {
            app_id: self.app_id.clone(),
            queue_code: self.queue_code.clone(),
            callback_key: self.callback_key.clone(),
            id: delivery.message_id.clone(),
            biz_id: delivery.correlation_id.clone(),
            body,
        };

        self.dispatcher
            .invoke(&message)
            .inspect_err(|_| self.metrics.record_callback_error())
    }

    /// Positive, non-multiple ack on the channel the origin tag names
    fn acknowledge(&self, delivery: &RawDelivery) {
        match self.channels.route(delivery.origin) {
            Some(channel) => match channel.ack(delivery.delivery_tag, false) {
                Ok(()) => {
                    self.metrics.record_acked();
                    counter!(
                        "mq_dispatcher_deliveries_acked_total",
                        "cluster" => delivery.origin.as_str()
                    )
                    .increment(1);
                }
                Err(e) => {
                    self.metrics.record_ack_failure();
                    error!(
                        origin = %delivery.origin,
                        delivery_tag = delivery.delivery_tag,
                        error = %e,
                        "ack failed"
                    );
                }
            },
            None => {
                self.metrics.record_ack_failure();
                error!(
                    origin = %delivery.origin,
                    delivery_tag = delivery.delivery_tag,
                    "no channel for origin, delivery left unacked"
                );
            }
        }
    }
}

/// Decode the serialized text payload of a delivery
fn decode_body(message_id: &str, body: &Bytes) -> std::result::Result<String, ContractError> {
    serde_json::from_slice(body).map_err(|e| ContractError::body_decode(message_id, e.to_string()))
}
