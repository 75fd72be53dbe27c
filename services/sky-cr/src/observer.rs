use core_logic::{Outcome, RunObserver};
use tracing::{debug, info};

/// Writes each result as a `task_result` log line.
///
/// Progress is logged at every tenth of the run and at completion.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn on_result(&self, label: &str, outcome: &Outcome) {
        if outcome.is_success() {
            info!(target: "task_result", "SUCCESS | {}: {}", label, outcome.message);
        } else {
            info!(target: "task_result", "FAILED | {}: {}", label, outcome.message);
        }
    }

    fn on_progress(&self, done: usize, total: usize) {
        let step = (total / 10).max(1);
        if done == total || done % step == 0 {
            info!(
                target: "task_result",
                "Progress {}/{} ({:.0}%)",
                done,
                total,
                done as f64 / total.max(1) as f64 * 100.0
            );
        } else {
            debug!("Progress {}/{}", done, total);
        }
    }
}
