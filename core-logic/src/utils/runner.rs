use crate::metrics::RunSummary;
use crate::traits::{Outcome, RunObserver, Task};
use crate::utils::progress::ProgressTracker;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

/// Fixed-size pool of workers draining a shared queue of independent items.
///
/// Every item yields exactly one reported outcome: items a worker never
/// picked up because the run was cancelled are reported as `Cancelled`.
pub struct WorkerPool {
    max_workers: usize,
    token: CancellationToken,
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            token: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Runs `task` over `items` and waits until every item has been reported.
    pub async fn run<I, T>(
        &self,
        items: Vec<I>,
        task: Arc<T>,
        observer: Arc<dyn RunObserver>,
    ) -> RunSummary
    where
        I: Send + Sync + 'static,
        T: Task<I> + 'static,
    {
        let total = items.len();
        let tracker = Arc::new(ProgressTracker::new(total, observer));
        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let workers = self.max_workers.min(total.max(1));

        info!(
            "Starting {} for {} items on {} workers...",
            task.name(),
            total,
            workers
        );

        let mut set = JoinSet::new();
        for i in 0..workers {
            let span = tracing::info_span!("worker", worker_id = format!("{:03}", i + 1));
            let queue = queue.clone();
            let task = task.clone();
            let tracker = tracker.clone();
            let token = self.token.clone();

            set.spawn(
                async move {
                    loop {
                        if token.is_cancelled() {
                            break;
                        }
                        let next = queue
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .pop_front();
                        let Some(item) = next else {
                            break;
                        };

                        let label = task.label(&item);
                        let started = Instant::now();
                        let outcome = task.run(&item).await;
                        tracker.report(&label, &outcome, started.elapsed());
                    }
                }
                .instrument(span),
            );
        }

        while let Some(res) = set.join_next().await {
            if let Err(e) = res {
                error!("A worker task panicked or failed to join: {:?}", e);
            }
        }

        let leftovers: Vec<I> = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        if !leftovers.is_empty() {
            info!("🛑 Run cancelled. {} items not started.", leftovers.len());
        }
        for item in leftovers {
            tracker.report(&task.label(&item), &Outcome::cancelled(), Duration::ZERO);
        }

        let summary = tracker.summary();
        info!(
            "Total Time: {:.1}s | Total Success: {} | Total Fail: {} | Success Rate: {:.2}%",
            summary.elapsed_ms as f64 / 1000.0,
            summary.success,
            summary.failed,
            summary.success_rate
        );
        summary
    }
}
