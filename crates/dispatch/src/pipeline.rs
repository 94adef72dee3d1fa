//! DispatchPipeline - fast write with synchronous authoritative fallback

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use contracts::{Message, MessageStore, StoreConfig};

use crate::error::DispatchError;
use crate::metrics::PipelineMetrics;
use crate::stores::{create_store, AnyStore};

/// The tiered-durability write path
///
/// Writes go to the fast store first; an ordinary rejection or an internal
/// fast-store error falls back to one synchronous authoritative write. The
/// verdict is a single boolean; no storage error ever reaches the caller.
/// No retries, no queuing of failed writes, no third tier.
pub struct DispatchPipeline<F: MessageStore + Sync, A: MessageStore + Sync> {
    fast: F,
    authoritative: A,
    metrics: Arc<PipelineMetrics>,
}

impl<F: MessageStore + Sync, A: MessageStore + Sync> DispatchPipeline<F, A> {
    /// Create a pipeline over a fast tier and an authoritative tier
    pub fn new(fast: F, authoritative: A) -> Self {
        info!(
            fast = fast.name(),
            authoritative = authoritative.name(),
            "dispatch pipeline created"
        );
        Self {
            fast,
            authoritative,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Get metrics handle
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Persist one message, returning whether either tier accepted it
    ///
    /// `true` means the message is durable in exactly one tier; `false`
    /// means both tiers failed and the caller owns surfacing that upstream.
    #[instrument(
        name = "dispatch",
        skip(self, message),
        fields(message_id = %message.id, queue_code = %message.queue_code)
    )]
    pub async fn dispatch(&self, message: &Message) -> bool {
        match self.fast.write(message).await {
            Ok(true) => {
                self.metrics.inc_fast_accepted();
                return true;
            }
            Ok(false) => {
                // Ordinary rejection, the expected fallback trigger
                self.metrics.inc_fast_rejected();
                debug!(
                    store = self.fast.name(),
                    message_id = %message.id,
                    "fast store rejected, falling back"
                );
            }
            Err(e) => {
                self.metrics.inc_fast_errors();
                warn!(
                    store = self.fast.name(),
                    message_id = %message.id,
                    error = %e,
                    "fast store write error, falling back"
                );
            }
        }

        match self.authoritative.write(message).await {
            Ok(true) => {
                self.metrics.inc_fallback_accepted();
                true
            }
            Ok(false) => {
                self.metrics.inc_fallback_failed();
                error!(
                    store = self.authoritative.name(),
                    message_id = %message.id,
                    "authoritative store rejected message"
                );
                false
            }
            Err(e) => {
                self.metrics.inc_fallback_failed();
                error!(
                    store = self.authoritative.name(),
                    message_id = %message.id,
                    error = %e,
                    "authoritative store write error"
                );
                false
            }
        }
    }
}

/// Convenience function to create a pipeline from store configs
#[instrument(name = "dispatch_create_pipeline", skip(fast, authoritative))]
pub fn create_pipeline(
    fast: &StoreConfig,
    authoritative: &StoreConfig,
) -> Result<DispatchPipeline<AnyStore, AnyStore>, DispatchError> {
    Ok(DispatchPipeline::new(
        create_store(fast)?,
        create_store(authoritative)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::ContractError;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Clone, Copy)]
    enum Behavior {
        Accept,
        Reject,
        Fail,
    }

    /// Mock store for testing
    struct MockStore {
        name: String,
        behavior: Behavior,
        write_count: Arc<AtomicU64>,
    }

    impl MockStore {
        fn new(name: &str, behavior: Behavior) -> Self {
            Self {
                name: name.to_string(),
                behavior,
                write_count: Arc::new(AtomicU64::new(0)),
            }
        }

        fn write_count(&self) -> Arc<AtomicU64> {
            Arc::clone(&self.write_count)
        }
    }

    impl MessageStore for MockStore {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&self, _message: &Message) -> Result<bool, ContractError> {
            self.write_count.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Accept => Ok(true),
                Behavior::Reject => Ok(false),
                Behavior::Fail => Err(ContractError::store_write(&self.name, "mock failure")),
            }
        }
    }

    fn message() -> Message {
        Message {
            id: "m1".into(),
            app_id: "trade".into(),
            queue_code: "orders".into(),
            biz_id: "biz-1".into(),
            body: Bytes::from_static(b"payload"),
        }
    }

    #[tokio::test]
    async fn fast_accept_skips_authoritative() {
        let fast = MockStore::new("fast", Behavior::Accept);
        let authoritative = MockStore::new("auth", Behavior::Accept);
        let auth_count = authoritative.write_count();

        let pipeline = DispatchPipeline::new(fast, authoritative);
        assert!(pipeline.dispatch(&message()).await);

        assert_eq!(auth_count.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.metrics().snapshot().fast_accepted, 1);
    }

    #[tokio::test]
    async fn fast_reject_falls_back() {
        let fast = MockStore::new("fast", Behavior::Reject);
        let authoritative = MockStore::new("auth", Behavior::Accept);
        let auth_count = authoritative.write_count();

        let pipeline = DispatchPipeline::new(fast, authoritative);
        assert!(pipeline.dispatch(&message()).await);

        assert_eq!(auth_count.load(Ordering::SeqCst), 1);
        let snapshot = pipeline.metrics().snapshot();
        assert_eq!(snapshot.fast_rejected, 1);
        assert_eq!(snapshot.fallback_accepted, 1);
    }

    #[tokio::test]
    async fn fallback_error_is_contained() {
        let fast = MockStore::new("fast", Behavior::Reject);
        let authoritative = MockStore::new("auth", Behavior::Fail);

        let pipeline = DispatchPipeline::new(fast, authoritative);
        // The authoritative error is converted to a verdict, not propagated
        assert!(!pipeline.dispatch(&message()).await);

        let snapshot = pipeline.metrics().snapshot();
        assert_eq!(snapshot.fallback_failed, 1);
        assert_eq!(snapshot.accepted(), 0);
    }

    #[tokio::test]
    async fn fast_error_falls_back() {
        let fast = MockStore::new("fast", Behavior::Fail);
        let authoritative = MockStore::new("auth", Behavior::Accept);
        let auth_count = authoritative.write_count();

        let pipeline = DispatchPipeline::new(fast, authoritative);
        assert!(pipeline.dispatch(&message()).await);

        assert_eq!(auth_count.load(Ordering::SeqCst), 1);
        let snapshot = pipeline.metrics().snapshot();
        assert_eq!(snapshot.fast_errors, 1);
        assert_eq!(snapshot.fallback_accepted, 1);
    }

    #[tokio::test]
    async fn both_tiers_failing_reports_false() {
        let fast = MockStore::new("fast", Behavior::Reject);
        let authoritative = MockStore::new("auth", Behavior::Reject);

        let pipeline = DispatchPipeline::new(fast, authoritative);
        assert!(!pipeline.dispatch(&message()).await);
        assert!(!pipeline.dispatch(&message()).await);

        assert_eq!(pipeline.metrics().snapshot().fallback_failed, 2);
    }

    #[tokio::test]
    async fn create_pipeline_from_config() {
        use contracts::{StoreConfig, StoreType};
        use std::collections::HashMap;

        let fast = StoreConfig {
            name: "mem_fast".into(),
            store_type: StoreType::Memory,
            params: HashMap::new(),
        };
        let authoritative = StoreConfig {
            name: "mem_auth".into(),
            store_type: StoreType::Memory,
            params: HashMap::new(),
        };

        let pipeline = create_pipeline(&fast, &authoritative).unwrap();
        assert!(pipeline.dispatch(&message()).await);
    }
}
