//! # OxiRes-LZW: Fixed-Width LZW for Resource Files
//!
//! This crate provides the LZW (Lempel-Ziv-Welch) codec used for compressed
//! resource payloads.
//!
//! ## Features
//!
//! - **Pure Rust**: No C dependencies, 100% safe Rust
//! - **Channel based**: reads from any [`ByteSource`] and writes to any
//!   [`ByteSink`], so data can be transformed on its way in or out
//! - **Bounded output**: compression aborts cleanly when the output would
//!   exceed a limit
//! - **Windowed expansion**: skip and limit capture a byte range of the
//!   decompressed stream
//! - **Reentrant**: every encoder/decoder owns its tables
//!
//! ## Stream Format
//!
//! - **Fixed code width**: 14 bits for resources (9-16 configurable)
//! - **MSB-first bit order** across byte boundaries
//! - **FLUSH code** (`2^bits - 2`): the encoder resets its dictionary after
//!   the table has been full for a while
//! - **END code** (`2^bits - 1`), followed by one zero code that pushes the
//!   last bits out
//! - **No header**: the payload size and location are stored elsewhere
//!
//! ## Example
//!
//! ```rust
//! use oxires_lzw::{compress_resource, decompress_resource};
//!
//! let original = b"TOBEORNOTTOBEORTOBEORNOT";
//!
//! let compressed = compress_resource(original).unwrap();
//! let decompressed = decompress_resource(&compressed).unwrap();
//!
//! assert_eq!(decompressed, original);
//! ```
//!
//! ## Channels
//!
//! ```rust
//! use oxires_core::{DiscardSink, SliceSource};
//! use oxires_lzw::{LzwConfig, LzwEncoder};
//!
//! let data = vec![7u8; 4096];
//! let mut encoder = LzwEncoder::new(LzwConfig::RESOURCE).unwrap();
//!
//! // Size the compressed form without storing it.
//! let size = encoder
//!     .compress(SliceSource::new(&data), data.len(), DiscardSink::new(), usize::MAX)
//!     .unwrap();
//! assert!(size < 200);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod bitstream_msb;
mod config;
mod decoder;
mod dictionary;
mod encoder;
mod error;
mod session;

pub use config::{FIRST_CODE, LzwConfig};
pub use decoder::LzwDecoder;
pub use encoder::LzwEncoder;
pub use error::{LzwError, Result};

pub use oxires_core::{ByteSink, ByteSource};

use oxires_core::{DiscardSink, SliceSource, VecSink};

/// Compress data with LZW using the given configuration.
///
/// # Example
///
/// ```rust
/// use oxires_lzw::{compress, LzwConfig};
///
/// let data = vec![b'A'; 300];
/// let compressed = compress(&data, LzwConfig::RESOURCE).unwrap();
/// assert!(compressed.len() < 60);
/// ```
pub fn compress(data: &[u8], config: LzwConfig) -> Result<Vec<u8>> {
    let mut encoder = LzwEncoder::new(config)?;
    encoder.encode(data)
}

/// Decompress LZW data with the given configuration.
///
/// # Example
///
/// ```rust
/// use oxires_lzw::{compress, decompress, LzwConfig};
///
/// let original = b"Hello, World!";
/// let compressed = compress(original, LzwConfig::RESOURCE).unwrap();
/// let decompressed = decompress(&compressed, LzwConfig::RESOURCE).unwrap();
/// assert_eq!(decompressed, original);
/// ```
pub fn decompress(data: &[u8], config: LzwConfig) -> Result<Vec<u8>> {
    let mut decoder = LzwDecoder::new(config)?;
    decoder.decode(data)
}

/// Decompress only `data`'s output bytes `skip..skip + take`.
///
/// Returns fewer than `take` bytes when the stream ends first.
///
/// # Example
///
/// ```rust
/// use oxires_lzw::{compress, decompress_range, LzwConfig};
///
/// let original = b"0123456789".repeat(10);
/// let compressed = compress(&original, LzwConfig::RESOURCE).unwrap();
/// let middle = decompress_range(&compressed, 15, 10, LzwConfig::RESOURCE).unwrap();
/// assert_eq!(middle, &original[15..25]);
/// ```
pub fn decompress_range(
    data: &[u8],
    skip: usize,
    take: usize,
    config: LzwConfig,
) -> Result<Vec<u8>> {
    let mut decoder = LzwDecoder::new(config)?;
    let mut sink = VecSink::with_capacity(take);
    decoder.expand(SliceSource::new(data), &mut sink, skip, Some(take))?;
    Ok(sink.into_inner())
}

/// Size of `data` once compressed, computed without storing the output.
pub fn compressed_size(data: &[u8], config: LzwConfig) -> Result<usize> {
    let mut encoder = LzwEncoder::new(config)?;
    encoder.compress(SliceSource::new(data), data.len(), DiscardSink::new(), usize::MAX)
}

/// Compress a resource payload (14-bit codes).
///
/// This is equivalent to `compress(data, LzwConfig::RESOURCE)`.
pub fn compress_resource(data: &[u8]) -> Result<Vec<u8>> {
    compress(data, LzwConfig::RESOURCE)
}

/// Decompress a resource payload (14-bit codes).
///
/// This is equivalent to `decompress(data, LzwConfig::RESOURCE)`.
pub fn decompress_resource(data: &[u8]) -> Result<Vec<u8>> {
    decompress(data, LzwConfig::RESOURCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_resource() {
        let original = b"TOBEORNOTTOBEORTOBEORNOT";
        let compressed = compress_resource(original).unwrap();
        assert_eq!(decompress_resource(&compressed).unwrap(), original);
    }

    #[test]
    fn test_compressed_size_matches_output() {
        let original = b"This is a test of compression! ".repeat(10);
        let compressed = compress_resource(&original).unwrap();
        assert_eq!(
            compressed_size(&original, LzwConfig::RESOURCE).unwrap(),
            compressed.len()
        );
    }

    #[test]
    fn test_range_past_end() {
        let original = b"short";
        let compressed = compress_resource(original).unwrap();
        let tail = decompress_range(&compressed, 3, 100, LzwConfig::RESOURCE).unwrap();
        assert_eq!(tail, b"rt");
        let none = decompress_range(&compressed, 10, 5, LzwConfig::RESOURCE).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_wide_codes() {
        let config = LzwConfig::new(16).unwrap();
        let original = b"wide codes wide codes wide codes".repeat(50);
        let compressed = compress(&original, config).unwrap();
        assert_eq!(decompress(&compressed, config).unwrap(), original);
    }
}
