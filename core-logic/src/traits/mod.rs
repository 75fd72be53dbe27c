use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    Success,
    Fail,
}

/// Result of executing one operation. Always fully populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Fail,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::fail("Cancelled")
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[async_trait]
pub trait Task<Item>: Send + Sync {
    /// Returns the name of the task
    fn name(&self) -> &str;

    /// Human-readable label for one item, used in result reports
    fn label(&self, item: &Item) -> String;

    /// Executes the task for one item. Failures are reported as `Outcome::fail`.
    async fn run(&self, item: &Item) -> Outcome;
}

/// Receives per-item results and progress from a run.
///
/// Callbacks may be invoked from worker tasks; implementations marshal to
/// their own presentation layer.
pub trait RunObserver: Send + Sync {
    fn on_result(&self, label: &str, outcome: &Outcome);

    fn on_progress(&self, done: usize, total: usize);
}

/// Observer that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_result(&self, _label: &str, _outcome: &Outcome) {}

    fn on_progress(&self, _done: usize, _total: usize) {}
}
