//! # OxiRes-Store: Resource Descriptors and LRU Residency
//!
//! This crate keeps track of the resources stored in resource files and
//! of which of them are loaded.
//!
//! ## Features
//!
//! - **Descriptor table**: one entry per [`ResourceId`], grown in steps
//! - **Retrieval**: raw, LZW-compressed and compound payloads from any
//!   `Read + Seek` resource file
//! - **LRU ring**: resident resources are ordered by use and paged out
//!   least recently used first; locked resources are pinned
//! - **Pager**: buffers come from a caller-supplied [`Pager`]
//! - **Payload writer**: appends payloads to a resource file and returns
//!   the descriptor data to register
//!
//! ## Compound resources
//!
//! A compound payload starts with a little-endian reference table: a
//! `u16` count `n` followed by `n + 1` `u32` offsets. The table is stored
//! uncompressed and copied verbatim; only the body after it is
//! compressed.
//!
//! ## Example
//!
//! ```rust
//! use oxires_store::{PayloadWriter, ResFlags, ResourceId, ResourceStore};
//! use std::io::Cursor;
//!
//! let mut writer = PayloadWriter::new(Cursor::new(Vec::new()), 0);
//! let text = b"It was a dark and stormy night. ".repeat(20);
//! let packed = writer.write(ResourceId(3), &text, ResFlags::LZW, 0).unwrap();
//! let file = writer.into_inner().unwrap();
//!
//! let mut store = ResourceStore::new();
//! store.attach_file(0, file);
//! store.define(ResourceId(3), packed.info).unwrap();
//! assert_eq!(store.get(ResourceId(3)).unwrap(), &text[..]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod descriptor;
pub mod error;
pub mod lru;
pub mod pager;
pub mod store;
pub mod table;
pub mod writer;

pub use descriptor::{OFFSET_PENDING, ResFlags, ResourceDescriptor, ResourceId, ResourceInfo};
pub use error::{Result, StoreError};
pub use lru::LruIter;
pub use pager::{HeapPager, Pager};
pub use store::{ResourceStore, StoreConfig};
pub use table::{DEFAULT_GROW_STEP, DescriptorTable};
pub use writer::{PackedResource, PayloadWriter};
