use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Session ID required")]
    MissingSession,

    #[error("User ID required")]
    MissingUser,

    #[error("{field} contains characters not allowed in an HTTP header")]
    InvalidHeaderValue { field: &'static str },
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] core_logic::ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Failure of a transport-level exchange, before any HTTP status is known.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// The world-quest preflight did not succeed; no claims were issued.
    #[error("Pre-process failed: {reason}")]
    Aborted { reason: String },
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{0} required")]
    MissingField(&'static str),

    #[error("No user matches '{0}'")]
    UnknownUser(String),

    #[error(transparent)]
    Storage(#[from] core_logic::StorageError),
}
