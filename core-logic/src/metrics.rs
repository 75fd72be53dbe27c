use crate::traits::Outcome;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Aggregate of one finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub success_rate: f64,
    pub elapsed_ms: u64,
    pub avg_item_ms: f64,
    pub max_item_ms: u64,
}

/// Lock-free counters for one run. Shared by all workers of that run.
#[derive(Debug)]
pub struct MetricsCollector {
    items_total: AtomicU64,
    items_success: AtomicU64,
    items_failed: AtomicU64,
    item_duration_sum_ms: AtomicU64,
    item_max_duration_ms: AtomicU64,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            items_total: AtomicU64::new(0),
            items_success: AtomicU64::new(0),
            items_failed: AtomicU64::new(0),
            item_duration_sum_ms: AtomicU64::new(0),
            item_max_duration_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: &Outcome, duration: Duration) {
        let duration_ms = duration.as_millis() as u64;
        self.items_total.fetch_add(1, Ordering::SeqCst);
        self.item_duration_sum_ms
            .fetch_add(duration_ms, Ordering::SeqCst);
        self.item_max_duration_ms
            .fetch_max(duration_ms, Ordering::SeqCst);

        if outcome.is_success() {
            self.items_success.fetch_add(1, Ordering::SeqCst);
        } else {
            self.items_failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn summary(&self) -> RunSummary {
        let total = self.items_total.load(Ordering::SeqCst);
        let success = self.items_success.load(Ordering::SeqCst);
        let failed = self.items_failed.load(Ordering::SeqCst);
        let duration_sum = self.item_duration_sum_ms.load(Ordering::SeqCst);

        let (success_rate, avg_item_ms) = if total > 0 {
            (
                (success as f64 / total as f64) * 100.0,
                duration_sum as f64 / total as f64,
            )
        } else {
            (0.0, 0.0)
        };

        RunSummary {
            total,
            success,
            failed,
            success_rate,
            elapsed_ms: self.start_time.elapsed().as_millis() as u64,
            avg_item_ms,
            max_item_ms: self.item_max_duration_ms.load(Ordering::SeqCst),
        }
    }
}
