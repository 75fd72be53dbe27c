//! # Core Logic - Shared Utilities for Automation Clients
//!
//! This crate provides the service-independent half of the automation tools:
//! how requests are retried, how work is fanned out and accounted for, how
//! settings are stored and how everything is logged.
//!
//! ## Modules
//!
//! - [`config`] - Client settings and their JSON persistence
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Per-run success/failure and timing counters
//! - [`storage`] - Atomic JSON document load/save
//! - [`traits`] - Outcome, Task and RunObserver definitions
//! - `utils` - Retry state machine, worker pool, progress tracking, logger

pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod traits;
pub(crate) mod utils;

pub use config::{ClientConfig, ConfigManager, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use error::{ConfigError, CoreError, StorageError};
pub use metrics::{MetricsCollector, RunSummary};
pub use storage::JsonStore;
pub use traits::{NoopObserver, Outcome, OutcomeStatus, RunObserver, Task};

pub use utils::{setup_logger, ProgressTracker, WorkerPool, RESULT_TARGET};

pub use utils::retry::{
    run_with_policy, AttemptVerdict, RetryPolicy, RetryState, MAX_RETRIES_MESSAGE,
};
