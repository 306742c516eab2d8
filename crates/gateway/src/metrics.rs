//! Gateway metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-gateway call counters
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    /// Transport calls attempted
    calls: AtomicU64,
    /// Calls that passed their value through
    successes: AtomicU64,
    /// Calls that resolved with a fallback
    fallbacks: AtomicU64,
    /// Blank searches answered without a transport call
    short_circuits: AtomicU64,
}

impl GatewayMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn inc_calls(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn inc_successes(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn inc_fallbacks(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn short_circuits(&self) -> u64 {
        self.short_circuits.load(Ordering::Relaxed)
    }

    pub fn inc_short_circuits(&self) {
        self.short_circuits.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls: self.calls(),
            successes: self.successes(),
            fallbacks: self.fallbacks(),
            short_circuits: self.short_circuits(),
        }
    }
}

/// Snapshot of gateway metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub calls: u64,
    pub successes: u64,
    pub fallbacks: u64,
    pub short_circuits: u64,
}
