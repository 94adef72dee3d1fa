//! Metric recording for the dispatch path
//!
//! Thin wrappers over the `metrics` facade; exported through the Prometheus
//! endpoint when one is installed. The delivery path emits its counters
//! directly from the consumer crate.

use metrics::counter;

/// Record one dispatch verdict for a store tier
pub fn record_message_dispatched(store: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "mq_dispatcher_messages_dispatched_total",
        "store" => store.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a fall-through to the authoritative tier
pub fn record_fallback_write(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "mq_dispatcher_fallback_writes_total",
        "status" => status.to_string()
    )
    .increment(1);
}
