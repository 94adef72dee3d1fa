//! Pipeline metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one dispatch pipeline
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Messages accepted by the fast store
    fast_accepted: AtomicU64,
    /// Ordinary fast-store rejections
    fast_rejected: AtomicU64,
    /// Fast-store write errors
    fast_errors: AtomicU64,
    /// Messages accepted by the fallback
    fallback_accepted: AtomicU64,
    /// Fallback rejections and errors
    fallback_failed: AtomicU64,
}

impl PipelineMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get fast-store accept count
    pub fn fast_accepted(&self) -> u64 {
        self.fast_accepted.load(Ordering::Relaxed)
    }

    /// Increment fast-store accept count
    pub fn inc_fast_accepted(&self) {
        self.fast_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get fast-store rejection count
    pub fn fast_rejected(&self) -> u64 {
        self.fast_rejected.load(Ordering::Relaxed)
    }

    /// Increment fast-store rejection count
    pub fn inc_fast_rejected(&self) {
        self.fast_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get fast-store error count
    pub fn fast_errors(&self) -> u64 {
        self.fast_errors.load(Ordering::Relaxed)
    }

    /// Increment fast-store error count
    pub fn inc_fast_errors(&self) {
        self.fast_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get fallback accept count
    pub fn fallback_accepted(&self) -> u64 {
        self.fallback_accepted.load(Ordering::Relaxed)
    }

    /// Increment fallback accept count
    pub fn inc_fallback_accepted(&self) {
        self.fallback_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get fallback failure count
    pub fn fallback_failed(&self) -> u64 {
        self.fallback_failed.load(Ordering::Relaxed)
    }

    /// Increment fallback failure count
    pub fn inc_fallback_failed(&self) {
        self.fallback_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            fast_accepted: self.fast_accepted(),
            fast_rejected: self.fast_rejected(),
            fast_errors: self.fast_errors(),
            fallback_accepted: self.fallback_accepted(),
            fallback_failed: self.fallback_failed(),
        }
    }
}

/// Snapshot of pipeline metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineSnapshot {
    pub fast_accepted: u64,
    pub fast_rejected: u64,
    pub fast_errors: u64,
    pub fallback_accepted: u64,
    pub fallback_failed: u64,
}

impl PipelineSnapshot {
    /// Messages durably accepted by either tier
    pub fn accepted(&self) -> u64 {
        self.fast_accepted + self.fallback_accepted
    }
}
