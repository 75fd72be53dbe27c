//! Whole-run entry points: one spawned task per user action.
//!
//! Each run owns its [`SessionClient`] and closes it on every exit path.

use crate::client::SessionClient;
use crate::dispatcher::BatchDispatcher;
use crate::registry::Target;
use crate::sequencer::OperationSequencer;
use crate::source::read_batch_source;
use anyhow::Result;
use core_logic::{RunObserver, RunSummary};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A run executing in the background.
pub struct RunHandle<T> {
    token: CancellationToken,
    handle: JoinHandle<T>,
}

impl<T> RunHandle<T> {
    /// Stops scheduling new items. In-flight requests finish normally.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub async fn join(self) -> Result<T, JoinError> {
        self.handle.await
    }
}

pub fn spawn_run<F, Fut, T>(run: F) -> RunHandle<T>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let token = CancellationToken::new();
    let handle = tokio::spawn(run(token.clone()));
    RunHandle { token, handle }
}

/// Claims every pickup batch listed in `source`.
pub async fn run_pickup(
    client: Arc<SessionClient>,
    source: &Path,
    max_workers: usize,
    token: CancellationToken,
    observer: Arc<dyn RunObserver>,
) -> Result<RunSummary> {
    info!(target: "task_result", "Starting CR...");
    let result = async {
        let items = read_batch_source(source)?;
        let summary = BatchDispatcher::new(max_workers)
            .with_cancellation(token)
            .run(client.clone(), items, observer)
            .await;
        Ok::<_, anyhow::Error>(summary)
    }
    .await;
    client.close();

    match &result {
        Ok(_) => info!(target: "task_result", "SUCCESS | CR complete"),
        Err(e) => error!(target: "task_result", "FAILED | CR error: {}", e),
    }
    result
}

/// World-quest preflight followed by quest and collectible claims.
pub async fn run_quests(
    client: Arc<SessionClient>,
    quests: &[String],
    collectibles: &[String],
    token: CancellationToken,
    observer: Arc<dyn RunObserver>,
) -> Result<RunSummary> {
    info!(target: "task_result", "Starting quests...");
    let result = async {
        if quests.is_empty() && collectibles.is_empty() {
            anyhow::bail!("No quests/collectibles");
        }
        let summary = OperationSequencer::new()
            .with_cancellation(token)
            .run_quests(&client, quests, collectibles, observer)
            .await?;
        Ok::<_, anyhow::Error>(summary)
    }
    .await;
    client.close();

    match &result {
        Ok(_) => info!(target: "task_result", "SUCCESS | Quest/collectible complete"),
        Err(e) => error!(target: "task_result", "FAILED | Quest error: {}", e),
    }
    result
}

/// Light and heart to every target.
pub async fn run_gifts(
    client: Arc<SessionClient>,
    targets: &[Target],
    token: CancellationToken,
    observer: Arc<dyn RunObserver>,
) -> Result<RunSummary> {
    info!(target: "task_result", "Sending gifts...");
    let result = async {
        if targets.is_empty() {
            anyhow::bail!("No targets selected");
        }
        let summary = OperationSequencer::new()
            .with_cancellation(token)
            .run_gifts(&client, targets, observer)
            .await;
        Ok::<_, anyhow::Error>(summary)
    }
    .await;
    client.close();

    match &result {
        Ok(_) => info!(target: "task_result", "SUCCESS | Gifts sent"),
        Err(e) => error!(target: "task_result", "FAILED | Gift error: {}", e),
    }
    result
}
