//! Error types for OxiRes byte channels.
//!
//! Every channel variant reports failures through [`OxiResError`]; the codec
//! and store crates wrap it in their own error enums.

use std::io;
use thiserror::Error;

/// The main error type for OxiRes channel operations.
#[derive(Debug, Error)]
pub enum OxiResError {
    /// I/O error from an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A source ran out of bytes.
    #[error("Unexpected end of data after {position} bytes")]
    UnexpectedEof {
        /// Number of bytes delivered before the source ran dry.
        position: u64,
    },

    /// A fixed-size destination buffer is full.
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Corrupted data detected by a channel transform.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },
}

/// Result type alias for OxiRes channel operations.
pub type Result<T> = std::result::Result<T, OxiResError>;

impl OxiResError {
    /// Create an unexpected end-of-data error.
    pub fn unexpected_eof(position: u64) -> Self {
        Self::UnexpectedEof { position }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Whether this error is the end-of-data condition.
    pub fn is_eof(&self) -> bool {
        match self {
            Self::UnexpectedEof { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}
