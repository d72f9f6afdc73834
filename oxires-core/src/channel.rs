//! Standard byte channel variants.
//!
//! | Variant                        | Location                  | Buffering            |
//! |--------------------------------|---------------------------|----------------------|
//! | [`SliceSource`] / [`SliceSink`] | memory block              | none (cursor)        |
//! | [`VecSink`]                    | growable memory block     | none                 |
//! | [`StreamSource`] / [`StreamSink`] | positioned `Read`/`Write` | none (byte per call) |
//! | [`BlockSource`] / [`BlockSink`] | positioned `Read`/`Write` | one block            |
//! | [`DiscardSink`]                | bit bucket                | none                 |
//! | [`FnSource`] / [`FnSink`]       | caller closure            | caller's choice      |
//!
//! User-defined channels are ordinary implementations of
//! [`ByteSource`]/[`ByteSink`]; the closure adapters cover the common case
//! of transforming data on its way through the codec.

use crate::error::{OxiResError, Result};
use crate::traits::{ByteSink, ByteSource};
use std::io::{self, Read, Write};

/// Default block size for [`BlockSource`] and [`BlockSink`].
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Reads bytes from a memory block, advancing a cursor.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed since `open`.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl ByteSource for SliceSource<'_> {
    fn open(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }

    #[inline]
    fn next_byte(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(OxiResError::unexpected_eof(self.pos as u64))?;
        self.pos += 1;
        Ok(byte)
    }
}

/// Writes bytes into a fixed memory block, advancing a cursor.
///
/// Running off the end of the block is an error, never a write out of
/// bounds.
#[derive(Debug)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceSink<'a> {
    /// Create a sink over `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written since `open`.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl ByteSink for SliceSink<'_> {
    fn open(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }

    #[inline]
    fn put_byte(&mut self, byte: u8) -> Result<()> {
        let available = self.buf.len();
        let slot = self
            .buf
            .get_mut(self.pos)
            .ok_or(OxiResError::buffer_too_small(available + 1, available))?;
        *slot = byte;
        self.pos += 1;
        Ok(())
    }
}

/// Appends bytes to a `Vec<u8>`.
///
/// Opening does not clear earlier contents, so several codec calls can
/// append to the same vector.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    data: Vec<u8>,
}

impl VecSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sink with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the sink and return the written bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl ByteSink for VecSink {
    #[inline]
    fn put_byte(&mut self, byte: u8) -> Result<()> {
        self.data.push(byte);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unbuffered streams
// ---------------------------------------------------------------------------

/// Reads one byte per call from an already positioned reader.
#[derive(Debug)]
pub struct StreamSource<R: Read> {
    reader: R,
    pos: u64,
}

impl<R: Read> StreamSource<R> {
    /// Create a source over `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader, pos: 0 }
    }

    /// Consume the source and return the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn open(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }

    fn next_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.reader.read_exact(&mut byte).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => OxiResError::unexpected_eof(self.pos),
            _ => OxiResError::Io(e),
        })?;
        self.pos += 1;
        Ok(byte[0])
    }
}

/// Writes one byte per call to an already positioned writer.
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    writer: W,
}

impl<W: Write> StreamSink<W> {
    /// Create a sink over `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ByteSink for StreamSink<W> {
    fn put_byte(&mut self, byte: u8) -> Result<()> {
        self.writer.write_all(&[byte])?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Block-buffered streams
// ---------------------------------------------------------------------------

/// Reads ahead one block at a time from an already positioned reader.
///
/// The read-ahead is discarded on `open`, so the reader may be repositioned
/// between codec calls. Bytes read ahead but not consumed are lost from the
/// reader's point of view.
#[derive(Debug)]
pub struct BlockSource<R: Read> {
    reader: R,
    block: Box<[u8]>,
    len: usize,
    pos: usize,
    consumed: u64,
}

impl<R: Read> BlockSource<R> {
    /// Create a source with the default block size.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_BLOCK_SIZE, reader)
    }

    /// Create a source with a block of `capacity` bytes.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            reader,
            block: vec![0u8; capacity.max(1)].into_boxed_slice(),
            len: 0,
            pos: 0,
            consumed: 0,
        }
    }

    /// Consume the source and return the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn refill(&mut self) -> Result<()> {
        loop {
            match self.reader.read(&mut self.block) {
                Ok(0) => return Err(OxiResError::unexpected_eof(self.consumed)),
                Ok(n) => {
                    self.len = n;
                    self.pos = 0;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<R: Read> ByteSource for BlockSource<R> {
    fn open(&mut self) -> Result<()> {
        self.len = 0;
        self.pos = 0;
        self.consumed = 0;
        Ok(())
    }

    #[inline]
    fn next_byte(&mut self) -> Result<u8> {
        if self.pos == self.len {
            self.refill()?;
        }
        let byte = self.block[self.pos];
        self.pos += 1;
        self.consumed += 1;
        Ok(byte)
    }
}

/// Collects bytes into a block and writes the block when it fills up and on
/// `close`.
#[derive(Debug)]
pub struct BlockSink<W: Write> {
    writer: W,
    block: Vec<u8>,
    capacity: usize,
}

impl<W: Write> BlockSink<W> {
    /// Create a sink with the default block size.
    pub fn new(writer: W) -> Self {
        Self::with_capacity(DEFAULT_BLOCK_SIZE, writer)
    }

    /// Create a sink with a block of `capacity` bytes.
    pub fn with_capacity(capacity: usize, writer: W) -> Self {
        let capacity = capacity.max(1);
        Self {
            writer,
            block: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Consume the sink and return the writer.
    ///
    /// Bytes still pending in the block are dropped; call `close` first.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_block(&mut self) -> Result<()> {
        if !self.block.is_empty() {
            self.writer.write_all(&self.block)?;
            self.block.clear();
        }
        Ok(())
    }
}

impl<W: Write> ByteSink for BlockSink<W> {
    fn open(&mut self) -> Result<()> {
        self.block.clear();
        Ok(())
    }

    #[inline]
    fn put_byte(&mut self, byte: u8) -> Result<()> {
        self.block.push(byte);
        if self.block.len() == self.capacity {
            self.write_block()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.write_block()?;
        self.writer.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Bit bucket
// ---------------------------------------------------------------------------

/// Drops every byte, counting them.
///
/// Used to size the output of a codec call without storing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink {
    count: u64,
}

impl DiscardSink {
    /// Create a new discard sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes dropped since `open`.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl ByteSink for DiscardSink {
    fn open(&mut self) -> Result<()> {
        self.count = 0;
        Ok(())
    }

    #[inline]
    fn put_byte(&mut self, _byte: u8) -> Result<()> {
        self.count += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Closures
// ---------------------------------------------------------------------------

/// A source backed by a closure.
pub struct FnSource<F> {
    get: F,
}

impl<F: FnMut() -> Result<u8>> FnSource<F> {
    /// Create a source that calls `get` for every byte.
    pub fn new(get: F) -> Self {
        Self { get }
    }
}

impl<F: FnMut() -> Result<u8>> ByteSource for FnSource<F> {
    fn next_byte(&mut self) -> Result<u8> {
        (self.get)()
    }
}

/// A sink backed by a closure.
pub struct FnSink<F> {
    put: F,
}

impl<F: FnMut(u8) -> Result<()>> FnSink<F> {
    /// Create a sink that calls `put` for every byte.
    pub fn new(put: F) -> Self {
        Self { put }
    }
}

impl<F: FnMut(u8) -> Result<()>> ByteSink for FnSink<F> {
    fn put_byte(&mut self, byte: u8) -> Result<()> {
        (self.put)(byte)
    }
}
