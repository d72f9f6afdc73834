//! LZW-specific error types.

use oxires_core::OxiResError;
use thiserror::Error;

/// LZW compression/decompression errors.
#[derive(Debug, Error)]
pub enum LzwError {
    /// Compressed output would exceed the caller's limit.
    #[error("Compressed output exceeds limit of {limit} bytes")]
    Overflow {
        /// Maximum number of output bytes allowed.
        limit: usize,
    },

    /// Code that is neither a literal, a defined string nor a control code.
    #[error("Invalid LZW code {code} (next free code {next_code})")]
    InvalidCode {
        /// The offending code.
        code: u32,
        /// Next unassigned dictionary code at that point.
        next_code: u32,
    },

    /// Structurally broken stream.
    #[error("Corrupt LZW stream: {message}")]
    CorruptStream {
        /// Description of the corruption.
        message: String,
    },

    /// Invalid code width specified.
    #[error("Invalid code width: {0} (must be 9-16)")]
    InvalidBitWidth(u8),

    /// Hash table size unusable for the code width.
    #[error("Invalid hash table size {table_size} for {code_bits}-bit codes")]
    InvalidTableSize {
        /// Requested table size.
        table_size: usize,
        /// Configured code width.
        code_bits: u8,
    },

    /// Working tables could not be allocated.
    #[error("Failed to allocate {bytes} bytes of LZW tables")]
    Alloc {
        /// Size of the failed allocation.
        bytes: usize,
    },

    /// Compressed input ended before the end code.
    #[error("Unexpected end of compressed data after {position} bytes")]
    UnexpectedEof {
        /// Compressed bytes consumed before the source ran dry.
        position: u64,
    },

    /// Error reported by a source or sink.
    #[error("Channel error: {0}")]
    Channel(#[from] OxiResError),
}

impl LzwError {
    /// Create a corrupt stream error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptStream {
            message: message.into(),
        }
    }
}

/// Result type for LZW operations.
pub type Result<T> = std::result::Result<T, LzwError>;
