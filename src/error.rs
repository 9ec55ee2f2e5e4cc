//! The library's single error type. Every fallible operation in the crate
//! returns [`DecodeError`] instead of a string or a boxed error, so callers
//! can match on the failure kind.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The container's format identifier has no registered kernel, or a
    /// compressed kernel was requested for a raw format (or vice versa).
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An encoded buffer's length is not a multiple of its format's block
    /// size, or a single-block input is not exactly one block long.
    #[error("length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A stream ended before the required number of bytes could be read.
    #[error("truncated stream: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// A single-block output slot is not a 4x4 grid.
    #[error("invalid block shape: expected 16 pixels (4x4), got {len}")]
    InvalidShape { len: usize },

    /// The operation's cancellation handle was tripped before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// The container's magic bytes were not recognized, or a structurally
    /// required header field failed validation.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// Propagated I/O failure from a stream-based entry point.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
