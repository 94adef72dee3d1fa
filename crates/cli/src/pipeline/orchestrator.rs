//! Pipeline orchestrator - coordinates all components.
//!
//! Wires the in-process broker pair, one consumer per binding, and the
//! tiered-durability write path, then drives a synthetic producer through
//! both so every configured piece is exercised.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bytes::Bytes;
use channel_factory::{LocalBroker, Publication};
use consumer::{BrokerConsumer, LogDispatcher};
use contracts::{ClusterTag, DispatchPlan, Message, QueueBinding};
use dispatch::{AnyStore, DispatchPipeline, PipelineSnapshot};
use observability::{record_fallback_write, record_message_dispatched};
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The dispatch plan
    pub plan: DispatchPlan,

    /// Number of synthetic messages to push
    pub message_count: u64,

    /// Drain timeout (None = default)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let plan = &self.config.plan;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Broker pair + consumers
        info!(
            master = %plan.broker.master.host,
            slave = %plan.broker.slave.host,
            "Starting in-process broker pair"
        );
        let broker = LocalBroker::new();
        let factory = Arc::new(broker.clone());

        let mut consumers = Vec::with_capacity(plan.bindings.len());
        for binding in &plan.bindings {
            let dispatcher = Arc::new(LogDispatcher::new(binding.callback_key.clone()));
            let consumer = BrokerConsumer::from_binding(
                binding,
                plan.broker.clone(),
                Arc::clone(&factory),
                dispatcher,
            );
            consumer.start().await;
            consumers.push(consumer);
        }

        info!(consumers = consumers.len(), "Consumers started");

        // Dispatch pipeline
        let pipeline = dispatch::create_pipeline(&plan.fast_store, &plan.authoritative_store)
            .context("Failed to create dispatch pipeline")?;

        // Synthetic producer: write path, then publish persisted messages,
        // alternating clusters so both ack paths run
        let mut stats = PipelineStats {
            active_consumers: consumers.len(),
            ..Default::default()
        };
        let mut cluster = ClusterTag::Master;

        for seq in 0..self.config.message_count {
            let binding = &plan.bindings[(seq % plan.bindings.len() as u64) as usize];
            let message = synthetic_message(binding, seq);

            let before = pipeline.metrics().snapshot();
            let accepted = pipeline.dispatch(&message).await;
            stats.messages_dispatched += 1;
            self.record_dispatch(&pipeline, before, accepted);

            if !accepted {
                stats.dispatch_failures += 1;
                warn!(message_id = %message.id, "message not persisted, skipping publish");
                continue;
            }

            broker.publish(
                cluster,
                &binding.queue_code,
                Publication {
                    message_id: message.id.clone(),
                    correlation_id: message.biz_id.clone(),
                    body: message.body.clone(),
                },
            );
            stats.messages_published += 1;
            cluster = cluster.peer();
        }

        // Wait for the delivery side to drain
        let drain_timeout = self.config.timeout.unwrap_or(Duration::from_secs(5));
        let published = stats.messages_published;
        let drain = async {
            loop {
                let acked: u64 = consumers
                    .iter()
                    .map(|consumer| consumer.metrics().snapshot().acks_sent)
                    .sum();
                if acked >= published {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        };
        if tokio::time::timeout(drain_timeout, drain).await.is_err() {
            warn!(
                timeout_secs = drain_timeout.as_secs(),
                "Timed out waiting for deliveries to drain"
            );
        }

        // Shutdown
        info!("Stopping consumers...");
        for consumer in &consumers {
            consumer.stop();
        }

        let write_side = pipeline.metrics().snapshot();
        stats.fast_writes = write_side.fast_accepted;
        stats.fallback_writes = write_side.fallback_accepted;

        for consumer in &consumers {
            let snapshot = consumer.metrics().snapshot();
            stats.deliveries_received += snapshot.deliveries_received;
            stats.deliveries_acked += snapshot.acks_sent;
            stats.callback_errors += snapshot.callback_errors;
            stats.ack_failures += snapshot.ack_failures;
        }

        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            throughput = format!("{:.2}", stats.throughput()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }

    /// Record one dispatch verdict on the metrics facade
    ///
    /// The producer loop is sequential, so the snapshot diff names the tier
    /// that actually took the write.
    fn record_dispatch(
        &self,
        pipeline: &DispatchPipeline<AnyStore, AnyStore>,
        before: PipelineSnapshot,
        accepted: bool,
    ) {
        let plan = &self.config.plan;
        let after = pipeline.metrics().snapshot();

        if after.fast_accepted > before.fast_accepted {
            record_message_dispatched(&plan.fast_store.name, true);
        } else if after.fallback_accepted > before.fallback_accepted {
            record_message_dispatched(&plan.authoritative_store.name, true);
            record_fallback_write(true);
        } else {
            record_message_dispatched(&plan.authoritative_store.name, accepted);
            record_fallback_write(false);
        }
    }
}

/// Build one synthetic producer message for a binding
fn synthetic_message(binding: &QueueBinding, seq: u64) -> Message {
    let body = serde_json::to_vec(&format!("synthetic payload {seq}"))
        .expect("string serialization cannot fail");

    Message {
        id: format!("msg-{seq}"),
        app_id: binding.app_id.clone(),
        queue_code: binding.queue_code.clone(),
        biz_id: format!("biz-{seq}"),
        body: Bytes::from(body),
    }
}
