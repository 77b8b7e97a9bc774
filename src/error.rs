//! Error handling for the aquawatch telemetry pipeline.

/// A specialized `Result` type for aquawatch operations.
pub type Result<T> = std::result::Result<T, AquaError>;

/// Classification of a single failed fetch attempt.
///
/// This is the only error type consumers of the poller ever observe: it is
/// recorded in [`PollState::last_error`](crate::client::PollState) rather
/// than propagated, so a polling loop survives indefinite transient
/// failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The store could not be reached (connection failure or timeout).
    #[error("snapshot store unreachable: {0}")]
    Unreachable(String),

    /// The store answered with a non-success HTTP status.
    #[error("snapshot store returned HTTP {0}")]
    StoreError(u16),

    /// The body was retrieved but is not a valid snapshot. Either the JSON
    /// failed to decode or a required field is missing/non-numeric.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

impl FetchError {
    /// Create a malformed-snapshot error naming the offending field.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSnapshot(msg.into())
    }

    /// Create an unreachable-store error.
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }
}

/// The main error type for producer, store, and binary operations.
#[derive(Debug, thiserror::Error)]
pub enum AquaError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a snapshot to the store failed
    #[error("store write failed: {0}")]
    StoreWrite(String),

    /// Snapshot store server error
    #[error("store server error: {0}")]
    StoreServer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AquaError {
    /// Create a new store write error
    pub fn store_write(msg: impl Into<String>) -> Self {
        Self::StoreWrite(msg.into())
    }

    /// Create a new store server error
    pub fn store_server(msg: impl Into<String>) -> Self {
        Self::StoreServer(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
