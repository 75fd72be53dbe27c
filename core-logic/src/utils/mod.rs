//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod logger;
pub(crate) mod progress;
pub(crate) mod retry;
pub(crate) mod runner;

pub use logger::{setup_logger, RESULT_TARGET};
pub use progress::ProgressTracker;
pub use runner::WorkerPool;
