//! Pipeline statistics and metrics.

use std::time::Duration;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Messages pushed through the dispatch pipeline
    pub messages_dispatched: u64,

    /// Messages accepted by the fast store
    pub fast_writes: u64,

    /// Messages accepted by the authoritative fallback
    pub fallback_writes: u64,

    /// Messages rejected by both tiers
    pub dispatch_failures: u64,

    /// Persisted messages published to the broker clusters
    pub messages_published: u64,

    /// Deliveries received across all consumers
    pub deliveries_received: u64,

    /// Acknowledgments issued across all consumers
    pub deliveries_acked: u64,

    /// Callback invocation failures
    pub callback_errors: u64,

    /// Acknowledgment failures
    pub ack_failures: u64,

    /// Number of consumers started
    pub active_consumers: usize,

    /// Total duration of the pipeline run
    pub duration: Duration,
}

impl PipelineStats {
    /// Calculate messages per second throughput
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.messages_dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate dispatch failure rate as percentage
    #[allow(dead_code)]
    pub fn failure_rate(&self) -> f64 {
        if self.messages_dispatched > 0 {
            (self.dispatch_failures as f64 / self.messages_dispatched as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Messages dispatched: {}", self.messages_dispatched);
        println!("   ├─ Throughput: {:.2} msg/s", self.throughput());
        println!("   └─ Active consumers: {}", self.active_consumers);

        println!("\n💾 Write Path");
        println!("   ├─ Fast store writes: {}", self.fast_writes);
        println!("   ├─ Fallback writes: {}", self.fallback_writes);
        println!("   └─ Failed dispatches: {}", self.dispatch_failures);

        println!("\n📥 Delivery Path");
        println!("   ├─ Messages published: {}", self.messages_published);
        println!("   ├─ Deliveries received: {}", self.deliveries_received);
        println!("   ├─ Deliveries acked: {}", self.deliveries_acked);
        println!("   ├─ Callback errors: {}", self.callback_errors);
        println!("   └─ Ack failures: {}", self.ack_failures);

        println!();
    }
}
