//! Strictly sequential flows: world-quest claiming and gift sending.
//!
//! Everything here runs on the caller's task, one request at a time.

use crate::client::SessionClient;
use crate::error::SequenceError;
use crate::operation::Operation;
use crate::registry::Target;
use core_logic::{Outcome, ProgressTracker, RunObserver, RunSummary};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Default)]
pub struct OperationSequencer {
    token: CancellationToken,
}

impl OperationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Preflight, then every quest claim, then every collectible claim.
    ///
    /// A failed preflight is reported once and aborts the sequence before
    /// any claim is sent. Individual claim failures do not stop later claims.
    pub async fn run_quests(
        &self,
        client: &SessionClient,
        quests: &[String],
        collectibles: &[String],
        observer: Arc<dyn RunObserver>,
    ) -> Result<RunSummary, SequenceError> {
        let steps = quest_steps(quests, collectibles);
        let tracker = ProgressTracker::new(steps.len(), observer);

        let preflight = Operation::GetAccountWorldQuests;
        let outcome = if self.token.is_cancelled() {
            Outcome::cancelled()
        } else {
            client.execute(&preflight).await
        };

        if !outcome.is_success() {
            tracker.report_uncounted(
                &preflight.label(),
                &Outcome::fail(format!("Pre-process failed: {}", outcome.message)),
            );
            return Err(SequenceError::Aborted {
                reason: outcome.message,
            });
        }
        tracker.report_uncounted(&preflight.label(), &Outcome::success("Pre-process OK"));

        Ok(self.run_steps(client, steps, &tracker).await)
    }

    /// Light then heart for each target, in list order.
    pub async fn run_gifts(
        &self,
        client: &SessionClient,
        targets: &[Target],
        observer: Arc<dyn RunObserver>,
    ) -> RunSummary {
        let steps = gift_steps(targets);
        let tracker = ProgressTracker::new(steps.len(), observer);
        self.run_steps(client, steps, &tracker).await
    }

    async fn run_steps(
        &self,
        client: &SessionClient,
        steps: Vec<Operation>,
        tracker: &ProgressTracker,
    ) -> RunSummary {
        for step in &steps {
            let started = Instant::now();
            let outcome = if self.token.is_cancelled() {
                Outcome::cancelled()
            } else {
                client.execute(step).await
            };
            tracker.report(&step.label(), &outcome, started.elapsed());
        }

        let summary = tracker.summary();
        info!(
            "Sequence finished: {} steps | Success: {} | Fail: {}",
            summary.total, summary.success, summary.failed
        );
        summary
    }
}

pub fn quest_steps(quests: &[String], collectibles: &[String]) -> Vec<Operation> {
    quests
        .iter()
        .map(|name| Operation::ClaimQuestReward { name: name.clone() })
        .chain(
            collectibles
                .iter()
                .map(|name| Operation::CollectCollectible { name: name.clone() }),
        )
        .collect()
}

pub fn gift_steps(targets: &[Target]) -> Vec<Operation> {
    targets
        .iter()
        .flat_map(|t| {
            [
                Operation::SendLight {
                    target_id: t.user_id.clone(),
                    target_name: t.name.clone(),
                },
                Operation::SendHeart {
                    target_id: t.user_id.clone(),
                    target_name: t.name.clone(),
                },
            ]
        })
        .collect()
}
