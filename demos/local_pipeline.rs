//! Local Pipeline Demo
//!
//! Demonstrates the full dispatch tier against the in-process broker pair:
//! write path through the tiered stores, delivery path through a
//! dual-cluster consumer. Runs without any broker deployment.
//!
//! Run with: cargo run --bin local_pipeline

use std::sync::Arc;

use bytes::Bytes;
use channel_factory::{LocalBroker, Publication};
use config_loader::{ConfigFormat, ConfigLoader};
use consumer::{BrokerConsumer, LogDispatcher};
use contracts::{ClusterTag, Message};
use dispatch::create_pipeline;

const DEMO_PLAN: &str = r#"
[broker.master]
host = "local-a"

[broker.slave]
host = "local-b"

[[bindings]]
app_id = "trade"
queue_code = "trade_order_created"
callback_key = "cb_order_created"

[fast_store]
name = "fast"
store_type = "memory"
[fast_store.params]
capacity = "5"

[authoritative_store]
name = "archive"
store_type = "log"
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Local Pipeline Demo");

    // ==== Stage 1: Load plan (file path arg or built-in demo plan) ====
    let plan = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading dispatch plan");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        ConfigLoader::load_from_str(DEMO_PLAN, ConfigFormat::Toml)?
    };

    // ==== Stage 2: Broker pair + consumer ====
    tracing::info!("Starting in-process broker pair...");
    let broker = LocalBroker::new();
    let factory = Arc::new(broker.clone());

    let binding = &plan.bindings[0];
    let consumer = BrokerConsumer::from_binding(
        binding,
        plan.broker.clone(),
        factory,
        Arc::new(LogDispatcher::new("demo")),
    );
    consumer.start().await;
    tracing::info!(queue_code = %binding.queue_code, "Consumer started");

    // ==== Stage 3: Dispatch pipeline ====
    let pipeline = create_pipeline(&plan.fast_store, &plan.authoritative_store)?;

    // ==== Stage 4: Produce ====
    // The small fast-tier capacity above forces the fallback path partway in
    let mut cluster = ClusterTag::Master;
    for seq in 0..12u64 {
        let message = Message {
            id: format!("demo-{seq}"),
            app_id: binding.app_id.clone(),
            queue_code: binding.queue_code.clone(),
            biz_id: format!("biz-{seq}"),
            body: Bytes::from(serde_json::to_vec(&format!("demo payload {seq}"))?),
        };

        if pipeline.dispatch(&message).await {
            broker.publish(
                cluster,
                &binding.queue_code,
                Publication {
                    message_id: message.id.clone(),
                    correlation_id: message.biz_id.clone(),
                    body: message.body.clone(),
                },
            );
            cluster = cluster.peer();
        } else {
            tracing::error!(message_id = %message.id, "message not persisted");
        }
    }

    // ==== Stage 5: Report ====
    let write_side = pipeline.metrics().snapshot();
    let delivery_side = consumer.metrics().snapshot();

    tracing::info!(
        fast_accepted = write_side.fast_accepted,
        fallback_accepted = write_side.fallback_accepted,
        deliveries = delivery_side.deliveries_received,
        acks = delivery_side.acks_sent,
        "Demo complete"
    );

    consumer.stop();
    Ok(())
}
