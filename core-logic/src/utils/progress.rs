use crate::metrics::{MetricsCollector, RunSummary};
use crate::traits::{Outcome, RunObserver};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::warn;

/// Serializes result/progress publication for one run.
///
/// Increment and publish happen under one lock, so observers see `done`
/// strictly increasing from 1 to `total`, never past it.
pub struct ProgressTracker {
    total: usize,
    done: Mutex<usize>,
    observer: Arc<dyn RunObserver>,
    metrics: MetricsCollector,
}

impl ProgressTracker {
    pub fn new(total: usize, observer: Arc<dyn RunObserver>) -> Self {
        Self {
            total,
            done: Mutex::new(0),
            observer,
            metrics: MetricsCollector::new(),
        }
    }

    /// Publishes one item's outcome and the new progress count.
    pub fn report(&self, label: &str, outcome: &Outcome, duration: Duration) -> usize {
        let mut done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        if *done >= self.total {
            warn!(
                "Dropping extra result for {} ({}/{} already reported)",
                label, *done, self.total
            );
            return *done;
        }

        *done += 1;
        self.metrics.record(outcome, duration);
        self.observer.on_result(label, outcome);
        self.observer.on_progress(*done, self.total);
        *done
    }

    /// Publishes an outcome that is not one of the counted items (e.g. a preflight failure).
    pub fn report_uncounted(&self, label: &str, outcome: &Outcome) {
        let _done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        self.observer.on_result(label, outcome);
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn done(&self) -> usize {
        *self.done.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn summary(&self) -> RunSummary {
        self.metrics.summary()
    }
}
