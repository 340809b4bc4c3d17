use thiserror::Error;

use botbrain_codec::CodecError;
use botbrain_store::StoreError;

/// Errors surfaced by brain operations.
///
/// Connect and auth failures are special: they are logged by the
/// readiness gate and leave dependent operations pending rather than
/// failing them, so they appear here only as reported values, never as
/// an operation's return.
#[derive(Debug, Error)]
pub enum BrainError {
    /// Invalid configuration (bad URL, prefix containing the separator).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The initial connect to the backing store failed.
    #[error("store connection failed: {0}")]
    Connection(String),

    /// The backing store rejected the configured credential.
    #[error("store authentication failed: {0}")]
    Auth(String),

    /// A stored payload could not be decoded (text mode only).
    #[error(transparent)]
    Deserialization(#[from] CodecError),

    /// An increment hit content that is not an integer.
    #[error("value at {key:?} is not an integer")]
    NumericConversion { key: String },

    /// The backing store rejected or failed a command.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for brain operations.
pub type BrainResult<T> = Result<T, BrainError>;
