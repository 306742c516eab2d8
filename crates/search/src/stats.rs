//! Search pipeline statistics.

use observability::{RunningStats, StatsSummary};

/// Counters for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Raw terms pushed into the pipeline
    pub received: u64,

    /// Terms replaced by a newer one before their quiet interval elapsed
    pub debounced: u64,

    /// Debounced terms dropped for equalling the previous one
    pub deduplicated: u64,

    /// Dispatches started
    pub dispatched: u64,

    /// Result sets handed to the consumer
    pub delivered: u64,

    /// Dispatches invalidated before they could deliver
    pub superseded: u64,

    /// Dispatch tasks that died before returning
    pub failed: u64,

    /// Dispatch latency of delivered result sets (milliseconds)
    pub latency_ms: RunningStats,
}

impl PipelineStats {
    /// Dispatches whose result nobody saw
    pub fn wasted(&self) -> u64 {
        self.dispatched.saturating_sub(self.delivered)
    }

    pub fn latency_summary(&self) -> StatsSummary {
        StatsSummary::from(&self.latency_ms)
    }

    /// Print a one-screen summary
    pub fn print_summary(&self) {
        println!("\nSearch pipeline");
        println!("   ├─ Terms received: {}", self.received);
        println!("   ├─ Debounced away: {}", self.debounced);
        println!("   ├─ Deduplicated: {}", self.deduplicated);
        println!("   ├─ Dispatched: {}", self.dispatched);
        println!("   ├─ Superseded: {}", self.superseded);
        println!("   ├─ Delivered: {}", self.delivered);
        println!("   ├─ Failed: {}", self.failed);
        println!("   └─ Latency (ms): {}", self.latency_summary());
    }
}
