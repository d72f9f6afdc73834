//! MSB-first fixed-width code packing.
//!
//! Codes are packed most significant bit first across byte boundaries. The
//! writer hands complete bytes to a [`ByteSink`] as soon as they exist; the
//! reader pulls bytes from a [`ByteSource`] only until it holds one full
//! code, so it never reads past the padding the writer produced.

use crate::error::{LzwError, Result};
use oxires_core::{ByteSink, ByteSource};

/// Packs fixed-width codes into bytes.
#[derive(Debug)]
pub(crate) struct MsbCodeWriter {
    /// Pending bits, right-aligned.
    buffer: u32,
    bits_in_buffer: u32,
    code_bits: u32,
    mask: u32,
    written: usize,
    limit: usize,
}

impl MsbCodeWriter {
    /// Create a writer that refuses to emit more than `limit` bytes.
    pub(crate) fn new(code_bits: u8, limit: usize) -> Self {
        let code_bits = u32::from(code_bits);
        Self {
            buffer: 0,
            bits_in_buffer: 0,
            code_bits,
            mask: (1u32 << code_bits) - 1,
            written: 0,
            limit,
        }
    }

    /// Append one code, flushing complete bytes to `sink`.
    pub(crate) fn put_code<D: ByteSink>(&mut self, sink: &mut D, code: u32) -> Result<()> {
        self.buffer = (self.buffer << self.code_bits) | (code & self.mask);
        self.bits_in_buffer += self.code_bits;

        while self.bits_in_buffer >= 8 {
            if self.written >= self.limit {
                return Err(LzwError::Overflow { limit: self.limit });
            }
            let byte = (self.buffer >> (self.bits_in_buffer - 8)) as u8;
            sink.put_byte(byte)?;
            self.written += 1;
            self.bits_in_buffer -= 8;
        }

        Ok(())
    }

    /// Bytes handed to the sink so far.
    pub(crate) fn written(&self) -> usize {
        self.written
    }
}

/// Unpacks fixed-width codes from bytes.
#[derive(Debug)]
pub(crate) struct MsbCodeReader {
    buffer: u32,
    bits_in_buffer: u32,
    code_bits: u32,
    mask: u32,
    bytes_read: u64,
}

impl MsbCodeReader {
    pub(crate) fn new(code_bits: u8) -> Self {
        let code_bits = u32::from(code_bits);
        Self {
            buffer: 0,
            bits_in_buffer: 0,
            code_bits,
            mask: (1u32 << code_bits) - 1,
            bytes_read: 0,
        }
    }

    /// Read the next code.
    pub(crate) fn get_code<S: ByteSource>(&mut self, source: &mut S) -> Result<u32> {
        while self.bits_in_buffer < self.code_bits {
            let byte = source.next_byte().map_err(|e| {
                if e.is_eof() {
                    LzwError::UnexpectedEof {
                        position: self.bytes_read,
                    }
                } else {
                    LzwError::Channel(e)
                }
            })?;
            self.buffer = (self.buffer << 8) | u32::from(byte);
            self.bits_in_buffer += 8;
            self.bytes_read += 1;
        }

        self.bits_in_buffer -= self.code_bits;
        Ok((self.buffer >> self.bits_in_buffer) & self.mask)
    }

    /// Compressed bytes consumed so far.
    pub(crate) fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}
