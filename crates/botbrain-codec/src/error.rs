use thiserror::Error;

/// Errors from encoding or decoding stored values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A value could not be encoded into store bytes.
    #[error("encode error: {0}")]
    Encode(String),

    /// Store bytes could not be decoded back into a value.
    ///
    /// Only raised in text mode; compact mode falls back to the raw
    /// text instead of failing.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
