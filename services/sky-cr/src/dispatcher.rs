use crate::client::SessionClient;
use crate::source::{BatchLine, PickupEntry};
use async_trait::async_trait;
use core_logic::{ClientConfig, Outcome, RunObserver, RunSummary, Task, WorkerPool};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub const MALFORMED_INPUT_PREFIX: &str = "Malformed input";

/// Parses one batch line and claims its pickups.
struct PickupTask {
    client: Arc<SessionClient>,
}

#[async_trait]
impl Task<BatchLine> for PickupTask {
    fn name(&self) -> &str {
        "collect_pickup_batch"
    }

    fn label(&self, item: &BatchLine) -> String {
        match PickupEntry::parse(&item.text) {
            Ok(entry) => format!("Level {}", entry.level_id),
            Err(_) => format!("Line {}", item.number),
        }
    }

    async fn run(&self, item: &BatchLine) -> Outcome {
        match PickupEntry::parse(&item.text) {
            Ok(entry) => self.client.execute(&entry.into_operation()).await,
            Err(reason) => {
                warn!("Skipping malformed {}: {}", item, reason);
                Outcome::fail(format!("{}: {}", MALFORMED_INPUT_PREFIX, reason))
            }
        }
    }
}

/// Fans pickup-batch lines out over a fixed worker pool.
///
/// Results may arrive in any order; each line yields exactly one outcome.
pub struct BatchDispatcher {
    pool: WorkerPool,
}

impl BatchDispatcher {
    pub fn new(max_workers: usize) -> Self {
        Self {
            pool: WorkerPool::new(max_workers),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.max_workers)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.pool = self.pool.with_cancellation(token);
        self
    }

    pub async fn run(
        &self,
        client: Arc<SessionClient>,
        items: Vec<BatchLine>,
        observer: Arc<dyn RunObserver>,
    ) -> RunSummary {
        let task = Arc::new(PickupTask { client });
        self.pool.run(items, task, observer).await
    }
}
