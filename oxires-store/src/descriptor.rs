//! Resource ids, flags and descriptors.

use crate::lru::LruLinks;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Identifier of a resource: its index in the descriptor table.
///
/// The first three ids are reserved: [`ResourceId::NULL`] and the two LRU
/// sentinels. Validating ids beyond that is the caller's concern; the
/// store reports ids outside its table as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ResourceId(pub u16);

impl ResourceId {
    /// No resource.
    pub const NULL: Self = Self(0);
    /// Head sentinel of the LRU ring (least recently used side).
    pub const HEAD: Self = Self(1);
    /// Tail sentinel of the LRU ring (most recently used side).
    pub const TAIL: Self = Self(2);
    /// First id available to resources.
    pub const FIRST: Self = Self(3);

    /// Index into the descriptor table.
    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Whether this id may name a resource.
    pub fn is_resource(self) -> bool {
        self >= Self::FIRST
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("${:04x}", self.0))
    }
}

impl From<u16> for ResourceId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

/// Resource descriptor flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResFlags(u8);

impl ResFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Payload is LZW-compressed.
    pub const LZW: Self = Self(0x01);
    /// Payload starts with a table of sub-reference offsets.
    pub const COMPOUND: Self = Self(0x02);
    /// Load as soon as the resource file is attached.
    pub const LOAD_ON_OPEN: Self = Self(0x08);
    /// Never page this resource out once loaded.
    pub const NO_DROP: Self = Self(0x10);

    /// Create flags from raw bits, keeping unknown bits.
    pub const fn from_bits_retain(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the flags in `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for ResFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ResFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Offset value of a resource whose data has not been written yet.
pub const OFFSET_PENDING: u32 = 1;

/// Where a resource lives and how it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceInfo {
    /// Materialized size in bytes, including a compound header.
    pub size: u32,
    /// Byte offset of the payload in its resource file.
    pub offset: u32,
    /// Resource file holding the payload.
    pub file_num: u8,
    /// Storage flags.
    pub flags: ResFlags,
    /// Resource type, as understood by the type table.
    pub type_tag: u8,
}

impl ResourceInfo {
    /// Size of the compound header for `num_refs` references: the 16-bit
    /// count plus `num_refs + 1` 32-bit offsets.
    pub const fn ref_table_size(num_refs: u16) -> usize {
        2 + 4 * (num_refs as usize + 1)
    }
}

/// One entry of the descriptor table.
#[derive(Debug)]
pub struct ResourceDescriptor {
    /// Static location and storage data.
    pub info: ResourceInfo,
    /// In-memory copy while resident.
    pub(crate) data: Option<Box<[u8]>>,
    pub(crate) lock_count: u8,
    pub(crate) links: LruLinks,
}

impl ResourceDescriptor {
    pub(crate) fn empty() -> Self {
        Self {
            info: ResourceInfo::default(),
            data: None,
            lock_count: 0,
            links: LruLinks::unlinked(),
        }
    }

    /// Whether the resource is loaded.
    pub fn is_resident(&self) -> bool {
        self.data.is_some()
    }

    /// The in-memory copy, if loaded.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Number of outstanding locks.
    pub fn lock_count(&self) -> u8 {
        self.lock_count
    }

    /// Whether the resource currently sits in the LRU ring.
    pub fn in_lru(&self) -> bool {
        self.links.is_linked()
    }
}
