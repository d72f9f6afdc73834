//! LZW dictionary tables.
//!
//! The compressor and expander index their tables differently:
//!
//! - [`EncodeTable`] is an open-addressed hash table keyed by
//!   `(prefix code, appended byte)`. Each slot holds the assigned code plus
//!   the pair that produced it.
//! - [`DecodeTable`] is indexed by code directly and rebuilds strings by
//!   walking prefix chains into a scratch stack.

use crate::config::{FIRST_CODE, LzwConfig};
use crate::error::{LzwError, Result};

/// Marks an unused hash slot. Never a valid dictionary code, since the
/// largest assignable code is two below the all-ones END code.
const EMPTY: u16 = u16::MAX;

fn alloc_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| LzwError::Alloc {
        bytes: len * std::mem::size_of::<T>(),
    })?;
    v.resize(len, value);
    Ok(v)
}

/// Compressor string table.
#[derive(Debug)]
pub(crate) struct EncodeTable {
    code_value: Vec<u16>,
    prefix_code: Vec<u16>,
    append_char: Vec<u8>,
    hash_shift: u32,
}

impl EncodeTable {
    pub(crate) fn new(config: &LzwConfig) -> Result<Self> {
        let size = config.table_size;
        Ok(Self {
            code_value: alloc_filled(size, EMPTY)?,
            prefix_code: alloc_filled(size, 0u16)?,
            append_char: alloc_filled(size, 0u8)?,
            hash_shift: config.hash_shift(),
        })
    }

    /// Forget every assigned code.
    pub(crate) fn clear(&mut self) {
        self.code_value.fill(EMPTY);
    }

    /// Find the slot holding `(prefix, ch)`, or the empty slot where it
    /// belongs.
    ///
    /// Probing starts at `(ch << shift) ^ prefix` and steps backward by
    /// `table_size - index` (1 from slot 0), wrapping around.
    pub(crate) fn find_slot(&self, prefix: u32, ch: u8) -> usize {
        let size = self.code_value.len();
        let mut index = ((u32::from(ch) << self.hash_shift) ^ prefix) as usize;
        let offset = if index == 0 { 1 } else { size - index };
        loop {
            if self.code_value[index] == EMPTY {
                return index;
            }
            if u32::from(self.prefix_code[index]) == prefix && self.append_char[index] == ch {
                return index;
            }
            index = if index >= offset {
                index - offset
            } else {
                index + size - offset
            };
        }
    }

    /// Code assigned at `slot`, if any.
    #[inline]
    pub(crate) fn code_at(&self, slot: usize) -> Option<u32> {
        match self.code_value[slot] {
            EMPTY => None,
            code => Some(u32::from(code)),
        }
    }

    pub(crate) fn insert(&mut self, slot: usize, code: u32, prefix: u32, ch: u8) {
        self.code_value[slot] = code as u16;
        self.prefix_code[slot] = prefix as u16;
        self.append_char[slot] = ch;
    }
}

/// Expander string table.
#[derive(Debug)]
pub(crate) struct DecodeTable {
    prefix_code: Vec<u16>,
    append_char: Vec<u8>,
    /// Decoded string, last byte first.
    stack: Vec<u8>,
}

impl DecodeTable {
    pub(crate) fn new(config: &LzwConfig) -> Result<Self> {
        let codes = config.max_code() as usize + 1;
        let mut stack = Vec::new();
        stack
            .try_reserve_exact(codes)
            .map_err(|_| LzwError::Alloc { bytes: codes })?;
        Ok(Self {
            prefix_code: alloc_filled(codes, 0u16)?,
            append_char: alloc_filled(codes, 0u8)?,
            stack,
        })
    }

    pub(crate) fn set(&mut self, code: u32, prefix: u32, ch: u8) {
        self.prefix_code[code as usize] = prefix as u16;
        self.append_char[code as usize] = ch;
    }

    /// Decode `code` into the stack, reversed.
    pub(crate) fn decode(&mut self, code: u32) -> Result<&[u8]> {
        self.stack.clear();
        self.walk(code)?;
        Ok(&self.stack)
    }

    /// Decode the code the compressor used before the expander could
    /// register it: the string of `prev` followed by its own first byte.
    pub(crate) fn decode_pending(&mut self, prev: u32, first: u8) -> Result<&[u8]> {
        self.stack.clear();
        self.stack.push(first);
        self.walk(prev)?;
        Ok(&self.stack)
    }

    /// Follow the prefix chain of `code` down to its literal.
    ///
    /// A chain longer than the code space can only come from a corrupt
    /// table, so it is reported rather than followed.
    fn walk(&mut self, mut code: u32) -> Result<()> {
        let limit = self.prefix_code.len();
        while code >= FIRST_CODE {
            if self.stack.len() >= limit {
                return Err(LzwError::corrupt(format!(
                    "prefix chain of code {code} exceeds {limit} entries"
                )));
            }
            let index = code as usize;
            self.stack.push(self.append_char[index]);
            code = u32::from(self.prefix_code[index]);
        }
        self.stack.push(code as u8);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_table_insert_and_find() {
        let config = LzwConfig::RESOURCE;
        let mut table = EncodeTable::new(&config).unwrap();

        let slot = table.find_slot(u32::from(b'A'), b'B');
        assert_eq!(table.code_at(slot), None);
        table.insert(slot, 256, u32::from(b'A'), b'B');

        assert_eq!(table.find_slot(u32::from(b'A'), b'B'), slot);
        assert_eq!(table.code_at(slot), Some(256));

        table.clear();
        assert_eq!(table.code_at(slot), None);
    }

    #[test]
    fn test_encode_table_collisions_probe_elsewhere() {
        let config = LzwConfig::RESOURCE;
        let mut table = EncodeTable::new(&config).unwrap();

        // (0, 0) hashes to slot 0; (64, 1) hashes to (1 << 6) ^ 64 == 0 too.
        let first = table.find_slot(0, 0);
        assert_eq!(first, 0);
        table.insert(first, 256, 0, 0);

        let second = table.find_slot(64, 1);
        assert_ne!(second, first);
        table.insert(second, 257, 64, 1);

        assert_eq!(table.code_at(table.find_slot(0, 0)), Some(256));
        assert_eq!(table.code_at(table.find_slot(64, 1)), Some(257));
    }

    #[test]
    fn test_decode_table_strings() {
        let config = LzwConfig::RESOURCE;
        let mut table = DecodeTable::new(&config).unwrap();
        table.set(256, u32::from(b'a'), b'b');
        table.set(257, 256, b'c');

        let reversed: Vec<u8> = table.decode(257).unwrap().to_vec();
        assert_eq!(reversed, b"cba");

        let literal: Vec<u8> = table.decode(u32::from(b'z')).unwrap().to_vec();
        assert_eq!(literal, b"z");

        let pending: Vec<u8> = table.decode_pending(256, b'a').unwrap().to_vec();
        assert_eq!(pending, b"aba");
    }

    #[test]
    fn test_decode_table_rejects_cycles() {
        let config = LzwConfig::new(9).unwrap();
        let mut table = DecodeTable::new(&config).unwrap();
        table.set(300, 301, b'x');
        table.set(301, 300, b'y');

        assert!(matches!(
            table.decode(300),
            Err(LzwError::CorruptStream { .. })
        ));
    }
}
