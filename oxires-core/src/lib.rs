//! # OxiRes Core
//!
//! Core components for the OxiRes resource system.
//!
//! - [`traits`]: the [`ByteSource`]/[`ByteSink`] channel contract
//! - [`channel`]: standard channel variants (memory, stream, block-buffered,
//!   discard, closures)
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Tools                                               │
//! │     oxires CLI (compress, expand, measure, pack)        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Resource store                                      │
//! │     descriptors, LRU ring, pager, retrieval             │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Codec                                               │
//! │     14-bit LZW with flush codes                         │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Channels (this crate)                               │
//! │     ByteSource/ByteSink, memory/file/discard variants   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxires_core::{ByteSink, ByteSource, SliceSource, VecSink};
//!
//! let data = b"resource";
//! let mut source = SliceSource::new(data);
//! let mut sink = VecSink::new();
//!
//! source.open().unwrap();
//! sink.open().unwrap();
//! for _ in 0..data.len() {
//!     sink.put_byte(source.next_byte().unwrap()).unwrap();
//! }
//! source.close().unwrap();
//! sink.close().unwrap();
//!
//! assert_eq!(sink.as_slice(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod channel;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use channel::{
    BlockSink, BlockSource, DEFAULT_BLOCK_SIZE, DiscardSink, FnSink, FnSource, SliceSink,
    SliceSource, StreamSink, StreamSource, VecSink,
};
pub use error::{OxiResError, Result};
pub use traits::{ByteSink, ByteSource};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::channel::{
        BlockSink, BlockSource, DiscardSink, SliceSink, SliceSource, StreamSink, StreamSource,
        VecSink,
    };
    pub use crate::error::{OxiResError, Result};
    pub use crate::traits::{ByteSink, ByteSource};
}
