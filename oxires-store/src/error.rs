//! Error types for the resource store.

use crate::descriptor::ResourceId;
use oxires_lzw::LzwError;
use std::io;
use thiserror::Error;

/// Errors raised by the resource store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The id has no descriptor, or is reserved.
    #[error("Unknown resource {0}")]
    UnknownResource(ResourceId),

    /// The resource's file number has no attached reader.
    #[error("Resource file {0} is not attached")]
    FileNotAttached(u8),

    /// The resource's data has not been written to its file yet.
    #[error("Resource {0} has no file offset yet")]
    OffsetPending(ResourceId),

    /// A compound header claims more bytes than the resource holds.
    #[error("Compound header of {id} needs {header} bytes, resource holds {size}")]
    HeaderOverrun {
        /// Resource id
        id: ResourceId,
        /// Header size from the reference count
        header: usize,
        /// Resource size
        size: usize,
    },

    /// The destination buffer cannot hold the resource.
    #[error("Buffer too small for {id}: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Resource id
        id: ResourceId,
        /// Resource size
        needed: usize,
        /// Buffer size
        available: usize,
    },

    /// A compressed payload expanded to the wrong length.
    #[error("Resource {id} expanded to {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Resource id
        id: ResourceId,
        /// Size from the descriptor
        expected: usize,
        /// Bytes produced
        actual: usize,
    },

    /// The pager could not provide memory for the resource.
    #[error("Out of memory loading {id} ({size} bytes)")]
    OutOfMemory {
        /// Resource id
        id: ResourceId,
        /// Requested size
        size: usize,
    },

    /// The resource is locked and cannot be dropped.
    #[error("Resource {0} is locked")]
    Locked(ResourceId),

    /// The lock count of a resource is saturated.
    #[error("Resource {0} has too many locks")]
    TooManyLocks(ResourceId),

    /// A resource was unlocked more often than locked.
    #[error("Resource {0} is not locked")]
    NotLocked(ResourceId),

    /// An LRU ring operation found the resource on the wrong side of the ring.
    #[error("Resource {id} is {} the LRU ring", ring_state(.linked))]
    LruMembership {
        /// Resource id
        id: ResourceId,
        /// Whether the operation needed the resource to be linked
        linked: bool,
    },

    /// Decompression failed.
    #[error("LZW error: {0}")]
    Lzw(#[from] LzwError),

    /// I/O error on a resource file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn ring_state(linked: &bool) -> &'static str {
    if *linked { "not in" } else { "already in" }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = StoreError::HeaderOverrun {
            id: ResourceId(7),
            header: 18,
            size: 10,
        };
        assert_eq!(
            err.to_string(),
            "Compound header of $0007 needs 18 bytes, resource holds 10"
        );

        let err = StoreError::LruMembership {
            id: ResourceId(9),
            linked: true,
        };
        assert_eq!(err.to_string(), "Resource $0009 is not in the LRU ring");
    }
}
