//! Consumer metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-consumer delivery metrics
#[derive(Debug, Default)]
pub struct ConsumerMetrics {
    /// Total deliveries received across both channels
    pub deliveries_received: AtomicU64,

    /// Body decode failures
    pub decode_errors: AtomicU64,

    /// Callback invocation failures
    pub callback_errors: AtomicU64,

    /// Acknowledgments issued
    pub acks_sent: AtomicU64,

    /// Acknowledgments that failed or could not be routed
    pub ack_failures: AtomicU64,
}

impl ConsumerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record delivery received
    pub fn record_received(&self) {
        self.deliveries_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record body decode failure
    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record callback failure
    pub fn record_callback_error(&self) {
        self.callback_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record acknowledgment sent
    pub fn record_acked(&self) {
        self.acks_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record acknowledgment failure
    pub fn record_ack_failure(&self) {
        self.ack_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            deliveries_received: self.deliveries_received.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            callback_errors: self.callback_errors.load(Ordering::Relaxed),
            acks_sent: self.acks_sent.load(Ordering::Relaxed),
            ack_failures: self.ack_failures.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    /// Total deliveries received
    pub deliveries_received: u64,

    /// Body decode failures
    pub decode_errors: u64,

    /// Callback invocation failures
    pub callback_errors: u64,

    /// Acknowledgments issued
    pub acks_sent: u64,

    /// Acknowledgments that failed
    pub ack_failures: u64,
}
