//! # Integration Tests
//!
//! End-to-end tests over the in-process broker pair.
//!
//! Covers:
//! - contract snapshot checks
//! - full delivery path (broker -> consumer -> dispatcher -> ack)
//! - full write path (pipeline -> fast tier -> fallback tier)

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // Verify the contracts crate surfaces stay available
        let _ = contracts::ConfigVersion::V1;
        let _ = contracts::ClusterTag::Master;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use bytes::Bytes;
    use channel_factory::{LocalBroker, Publication};
    use consumer::BrokerConsumer;
    use contracts::{
        BrokerConfig, CallbackDispatcher, CallbackMessage, ClusterEndpoint, ClusterTag,
        ContractError, Message,
    };
    use dispatch::{DispatchPipeline, MemoryStore};

    /// Dispatcher that records every callback message
    struct CountingDispatcher {
        invoked: Mutex<Vec<CallbackMessage>>,
        failures: AtomicU64,
        fail: bool,
    }

    impl CountingDispatcher {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                invoked: Mutex::new(Vec::new()),
                failures: AtomicU64::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                invoked: Mutex::new(Vec::new()),
                failures: AtomicU64::new(0),
                fail: true,
            })
        }

        fn messages(&self) -> Vec<CallbackMessage> {
            self.invoked.lock().unwrap().clone()
        }
    }

    impl CallbackDispatcher for CountingDispatcher {
        fn invoke(&self, message: &CallbackMessage) -> Result<(), ContractError> {
            self.invoked.lock().unwrap().push(message.clone());
            if self.fail {
                self.failures.fetch_add(1, Ordering::SeqCst);
                return Err(ContractError::callback(&message.callback_key, "e2e failure"));
            }
            Ok(())
        }
    }

    fn broker_config() -> BrokerConfig {
        BrokerConfig {
            master: ClusterEndpoint {
                host: "local-a".into(),
                port: 5672,
                vhost: "/".into(),
            },
            slave: ClusterEndpoint {
                host: "local-b".into(),
                port: 5672,
                vhost: "/".into(),
            },
        }
    }

    fn text_publication(id: &str, biz_id: &str, text: &str) -> Publication {
        Publication {
            message_id: id.to_string(),
            correlation_id: biz_id.to_string(),
            body: Bytes::from(serde_json::to_vec(text).unwrap()),
        }
    }

    /// End-to-end test: LocalBroker -> BrokerConsumer -> CountingDispatcher
    ///
    /// Verifies the complete delivery path:
    /// 1. Messages published to both clusters of one logical queue
    /// 2. The consumer normalizes and dispatches each delivery
    /// 3. Every delivery is acked and no backlog remains
    #[tokio::test]
    async fn test_e2e_delivery_path() {
        let broker = LocalBroker::new();
        let dispatcher = CountingDispatcher::new();
        let consumer = BrokerConsumer::new(
            "trade",
            "trade_order_created",
            "cb_order_created",
            broker_config(),
            Arc::new(broker.clone()),
            dispatcher.clone(),
        );
        consumer.start().await;

        let mut cluster = ClusterTag::Master;
        for seq in 0..10 {
            broker.publish(
                cluster,
                "trade_order_created",
                text_publication(&format!("m{seq}"), &format!("biz-{seq}"), "payload"),
            );
            cluster = cluster.peer();
        }

        let messages = dispatcher.messages();
        assert_eq!(messages.len(), 10);
        assert!(messages.iter().all(|m| m.app_id == "trade"));
        assert!(messages.iter().all(|m| m.body == "payload"));

        let snapshot = consumer.metrics().snapshot();
        assert_eq!(snapshot.deliveries_received, 10);
        assert_eq!(snapshot.acks_sent, 10);
        assert_eq!(snapshot.ack_failures, 0);

        assert_eq!(broker.queue_depth(ClusterTag::Master, "trade_order_created"), 0);
        assert_eq!(broker.queue_depth(ClusterTag::Slave, "trade_order_created"), 0);

        consumer.stop();
    }

    /// The worked example: message "m1", correlation "biz-1", cluster
    /// "master", body decoding to "hello"
    #[tokio::test]
    async fn test_e2e_master_delivery_scenario() {
        let broker = LocalBroker::new();
        let dispatcher = CountingDispatcher::new();
        let consumer = BrokerConsumer::new(
            "trade",
            "orders",
            "cb_orders",
            broker_config(),
            Arc::new(broker.clone()),
            dispatcher.clone(),
        );
        consumer.start().await;

        broker.publish(
            ClusterTag::Master,
            "orders",
            text_publication("m1", "biz-1", "hello"),
        );

        let messages = dispatcher.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "m1");
        assert_eq!(messages[0].biz_id, "biz-1");
        assert_eq!(messages[0].body, "hello");
        assert_eq!(messages[0].callback_key, "cb_orders");

        assert_eq!(consumer.metrics().snapshot().acks_sent, 1);
        consumer.stop();
    }

    /// A failing callback never blocks acknowledgment or later deliveries
    #[tokio::test]
    async fn test_e2e_failing_callback_still_drains() {
        let broker = LocalBroker::new();
        let dispatcher = CountingDispatcher::failing();
        let consumer = BrokerConsumer::new(
            "trade",
            "orders",
            "cb_orders",
            broker_config(),
            Arc::new(broker.clone()),
            dispatcher.clone(),
        );
        consumer.start().await;

        for seq in 0..5 {
            broker.publish(
                ClusterTag::Slave,
                "orders",
                text_publication(&format!("m{seq}"), &format!("biz-{seq}"), "x"),
            );
        }

        assert_eq!(dispatcher.failures.load(Ordering::SeqCst), 5);
        let snapshot = consumer.metrics().snapshot();
        assert_eq!(snapshot.callback_errors, 5);
        assert_eq!(snapshot.acks_sent, 5);
        assert_eq!(broker.queue_depth(ClusterTag::Slave, "orders"), 0);

        consumer.stop();
    }

    /// An undecodable body is dropped (acked) without reaching the dispatcher
    #[tokio::test]
    async fn test_e2e_undecodable_body_is_acked_away() {
        let broker = LocalBroker::new();
        let dispatcher = CountingDispatcher::new();
        let consumer = BrokerConsumer::new(
            "trade",
            "orders",
            "cb_orders",
            broker_config(),
            Arc::new(broker.clone()),
            dispatcher.clone(),
        );
        consumer.start().await;

        broker.publish(
            ClusterTag::Master,
            "orders",
            Publication {
                message_id: "garbled".into(),
                correlation_id: "biz-garbled".into(),
                body: Bytes::from_static(b"\xff\xfe not a payload"),
            },
        );

        assert!(dispatcher.messages().is_empty());
        let snapshot = consumer.metrics().snapshot();
        assert_eq!(snapshot.decode_errors, 1);
        assert_eq!(snapshot.acks_sent, 1);

        consumer.stop();
    }

    /// Backlog published before the consumer starts is delivered on start
    #[tokio::test]
    async fn test_e2e_backlog_consumed_on_start() {
        let broker = LocalBroker::new();
        for seq in 0..3 {
            broker.publish(
                ClusterTag::Master,
                "orders",
                text_publication(&format!("m{seq}"), &format!("biz-{seq}"), "early"),
            );
        }
        assert_eq!(broker.queue_depth(ClusterTag::Master, "orders"), 3);

        let dispatcher = CountingDispatcher::new();
        let consumer = BrokerConsumer::new(
            "trade",
            "orders",
            "cb_orders",
            broker_config(),
            Arc::new(broker.clone()),
            dispatcher.clone(),
        );
        consumer.start().await;

        assert_eq!(dispatcher.messages().len(), 3);
        assert_eq!(broker.queue_depth(ClusterTag::Master, "orders"), 0);
        consumer.stop();
    }

    /// End-to-end write path: fast tier fills up, fallback takes the rest
    #[tokio::test]
    async fn test_e2e_write_path_fallback() {
        let pipeline = DispatchPipeline::new(
            MemoryStore::new("fast", 3),
            MemoryStore::new("archive", 0),
        );

        for seq in 0..8 {
            let message = Message {
                id: format!("m{seq}"),
                app_id: "trade".into(),
                queue_code: "orders".into(),
                biz_id: format!("biz-{seq}"),
                body: Bytes::from_static(b"payload"),
            };
            assert!(pipeline.dispatch(&message).await);
        }

        let snapshot = pipeline.metrics().snapshot();
        assert_eq!(snapshot.fast_accepted, 3);
        assert_eq!(snapshot.fast_rejected, 5);
        assert_eq!(snapshot.fallback_accepted, 5);
        assert_eq!(snapshot.accepted(), 8);
    }

    /// Two consumers on distinct queues share the broker without crosstalk
    #[tokio::test]
    async fn test_e2e_two_bindings_are_isolated() {
        let broker = LocalBroker::new();
        let orders_dispatcher = CountingDispatcher::new();
        let refunds_dispatcher = CountingDispatcher::new();

        let orders = BrokerConsumer::new(
            "trade",
            "orders",
            "cb_orders",
            broker_config(),
            Arc::new(broker.clone()),
            orders_dispatcher.clone(),
        );
        let refunds = BrokerConsumer::new(
            "trade",
            "refunds",
            "cb_refunds",
            broker_config(),
            Arc::new(broker.clone()),
            refunds_dispatcher.clone(),
        );
        orders.start().await;
        refunds.start().await;

        broker.publish(
            ClusterTag::Master,
            "orders",
            text_publication("o1", "biz-o1", "order"),
        );
        broker.publish(
            ClusterTag::Slave,
            "refunds",
            text_publication("r1", "biz-r1", "refund"),
        );

        // Give nothing extra time on purpose: delivery is synchronous
        assert_eq!(orders_dispatcher.messages().len(), 1);
        assert_eq!(orders_dispatcher.messages()[0].id, "o1");
        assert_eq!(refunds_dispatcher.messages().len(), 1);
        assert_eq!(refunds_dispatcher.messages()[0].queue_code, "refunds");

        orders.stop();
        refunds.stop();
    }

    /// A loaded plan builds a working write path end to end
    #[tokio::test]
    async fn test_e2e_plan_to_pipeline() {
        let plan = config_loader::ConfigLoader::load_from_str(
            r#"
[broker.master]
host = "local-a"

[broker.slave]
host = "local-b"

[[bindings]]
app_id = "trade"
queue_code = "orders"
callback_key = "cb_orders"

[fast_store]
name = "fast"
store_type = "memory"
[fast_store.params]
capacity = "1"

[authoritative_store]
name = "archive"
store_type = "memory"
"#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let pipeline =
            dispatch::create_pipeline(&plan.fast_store, &plan.authoritative_store).unwrap();

        for seq in 0..3 {
            let message = Message {
                id: format!("m{seq}"),
                app_id: "trade".into(),
                queue_code: "orders".into(),
                biz_id: format!("biz-{seq}"),
                body: Bytes::from_static(b"payload"),
            };
            assert!(pipeline.dispatch(&message).await);
        }

        let snapshot = pipeline.metrics().snapshot();
        assert_eq!(snapshot.fast_accepted, 1);
        assert_eq!(snapshot.fallback_accepted, 2);
    }

    /// Concurrent publishers on both clusters drain cleanly
    #[tokio::test]
    async fn test_e2e_concurrent_clusters() {
        let broker = LocalBroker::new();
        let dispatcher = CountingDispatcher::new();
        let consumer = BrokerConsumer::new(
            "trade",
            "orders",
            "cb_orders",
            broker_config(),
            Arc::new(broker.clone()),
            dispatcher.clone(),
        );
        consumer.start().await;

        let master_feed = {
            let broker = broker.clone();
            std::thread::spawn(move || {
                for seq in 0..40 {
                    broker.publish(
                        ClusterTag::Master,
                        "orders",
                        text_publication(&format!("ma-{seq}"), &format!("biz-ma-{seq}"), "m"),
                    );
                }
            })
        };
        let slave_feed = {
            let broker = broker.clone();
            std::thread::spawn(move || {
                for seq in 0..40 {
                    broker.publish(
                        ClusterTag::Slave,
                        "orders",
                        text_publication(&format!("sl-{seq}"), &format!("biz-sl-{seq}"), "s"),
                    );
                }
            })
        };
        master_feed.join().unwrap();
        slave_feed.join().unwrap();

        // Deliveries run on the publisher threads; give the counters a beat
        tokio::time::sleep(Duration::from_millis(50)).await;

        let snapshot = consumer.metrics().snapshot();
        assert_eq!(snapshot.deliveries_received, 80);
        assert_eq!(snapshot.acks_sent, 80);
        assert_eq!(snapshot.ack_failures, 0);
        assert_eq!(dispatcher.messages().len(), 80);

        consumer.stop();
    }
}
