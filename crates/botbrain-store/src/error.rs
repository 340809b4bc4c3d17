use thiserror::Error;

use crate::types::ValueKind;

/// Errors from backing-store commands and connection handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The initial connect to the store failed.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// The store rejected the configured credential.
    #[error("authentication rejected")]
    AuthRejected,

    /// The store requires authentication before commands are accepted.
    #[error("authentication required")]
    AuthRequired,

    /// A command was issued before the connection was established.
    #[error("not connected")]
    NotConnected,

    /// A command addressed a key holding a different collection kind.
    #[error("wrong kind for key {key:?}: expected {expected}, found {found}")]
    WrongKind {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// An increment touched content that is not an integer string.
    #[error("value at {0:?} is not an integer")]
    NotAnInteger(String),

    /// An increment would leave the 64-bit integer range.
    #[error("increment on {0:?} overflows")]
    Overflow(String),

    /// A positional list command addressed an index outside the list.
    #[error("index {index} out of range for key {key:?}")]
    IndexOutOfRange { key: String, index: i64 },

    /// The store rejected or failed a command for a backend-specific reason.
    #[error("command failed: {0}")]
    Command(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
