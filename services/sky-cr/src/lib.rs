//! # sky-cr
//!
//! Bulk automation against the Sky game-service API for saved accounts:
//! candle-run pickup batches fanned out over a worker pool, world-quest and
//! collectible claims behind a preflight gate, and light/heart gifts to
//! selected friends.
//!
//! - [`client`] - retrying request client and session-bound operations
//! - [`dispatcher`] - concurrent pickup batch runs
//! - [`sequencer`] - strictly sequential quest and gift flows
//! - [`runs`] - background run entry points that own the client lifecycle

pub mod client;
pub mod credential;
pub mod dispatcher;
pub mod error;
pub mod observer;
pub mod operation;
pub mod paths;
pub mod registry;
pub mod runs;
pub mod sequencer;
pub mod source;
pub mod transport;

pub use client::{RetryingRequestClient, SessionClient};
pub use credential::Credential;
pub use dispatcher::BatchDispatcher;
pub use error::{ClientError, CredentialError, RegistryError, SequenceError, TransportError};
pub use observer::LogObserver;
pub use operation::{LevelId, Operation};
pub use paths::DataPaths;
pub use registry::{Target, TargetRegistry, UserProfile, UserRegistry};
pub use sequencer::OperationSequencer;
pub use source::{BatchLine, PickupEntry};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
