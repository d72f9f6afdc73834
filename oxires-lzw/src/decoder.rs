//! LZW decoder (decompression).
//!
//! The decoder mirrors the encoder's dictionary one code behind: a new
//! entry `(previous code, first byte of current string)` is registered
//! after each string is emitted. The one case where the encoder uses an
//! entry the decoder has not registered yet (input shaped like
//! `cScSc`) shows up as a code equal to the next free code and is
//! rebuilt from the previous string.

use crate::bitstream_msb::MsbCodeReader;
use crate::config::{FIRST_CODE, LzwConfig};
use crate::dictionary::DecodeTable;
use crate::error::{LzwError, Result};
use crate::session::bracket;
use oxires_core::{ByteSink, ByteSource, SliceSource, VecSink};
use tracing::{debug, warn};

/// Output window of one expansion: drop the first `skip` bytes, then keep
/// at most `limit`.
#[derive(Debug)]
struct Window {
    skip: usize,
    limit: Option<usize>,
    written: usize,
}

impl Window {
    fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.written >= limit)
    }

    /// Emit one byte. Returns `false` once the window is full.
    #[inline]
    fn emit<D: ByteSink>(&mut self, sink: &mut D, byte: u8) -> Result<bool> {
        if self.skip > 0 {
            self.skip -= 1;
            return Ok(true);
        }
        sink.put_byte(byte)?;
        self.written += 1;
        Ok(!self.is_full())
    }
}

/// LZW decoder for decompression.
///
/// Like [`LzwEncoder`](crate::LzwEncoder), a decoder owns its tables and
/// can be reused across calls.
#[derive(Debug)]
pub struct LzwDecoder {
    config: LzwConfig,
    table: DecodeTable,
}

impl LzwDecoder {
    /// Create a new LZW decoder with the given configuration.
    pub fn new(config: LzwConfig) -> Result<Self> {
        config.validate()?;
        let table = DecodeTable::new(&config)?;
        Ok(Self { config, table })
    }

    /// Get the configuration.
    pub fn config(&self) -> &LzwConfig {
        &self.config
    }

    /// Expand compressed bytes from `source` into `sink`.
    ///
    /// The first `skip` decompressed bytes are discarded. With
    /// `limit = Some(n)` expansion stops as soon as `n` bytes were written;
    /// `None` expands up to the END code. Together they capture
    /// `D[skip..skip + n]` of the full output `D` without materializing
    /// the rest.
    ///
    /// # Returns
    ///
    /// The number of bytes written to `sink`.
    ///
    /// # Errors
    ///
    /// Corrupt input is reported instead of being followed:
    /// [`LzwError::InvalidCode`] for codes beyond the dictionary,
    /// [`LzwError::CorruptStream`] for broken structure and
    /// [`LzwError::UnexpectedEof`] when the END code never arrives.
    pub fn expand<S, D>(
        &mut self,
        mut source: S,
        mut sink: D,
        skip: usize,
        limit: Option<usize>,
    ) -> Result<usize>
    where
        S: ByteSource,
        D: ByteSink,
    {
        let mut window = Window {
            skip,
            limit,
            written: 0,
        };
        let mut reader = MsbCodeReader::new(self.config.code_bits);

        let result = bracket(&mut source, &mut sink, |source, sink| {
            self.run(source, sink, &mut reader, &mut window)
        });

        match result {
            Ok(()) => {
                debug!(
                    input = reader.bytes_read(),
                    output = window.written,
                    skip,
                    "LZW expand finished"
                );
                Ok(window.written)
            }
            Err(e) => {
                warn!(input = reader.bytes_read(), error = %e, "LZW expand failed");
                Err(e)
            }
        }
    }

    /// Expand a complete compressed buffer into a new vector.
    pub fn decode(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut sink = VecSink::with_capacity(input.len() * 2);
        self.expand(SliceSource::new(input), &mut sink, 0, None)?;
        Ok(sink.into_inner())
    }

    fn literal(&self, code: u32) -> Result<u32> {
        if code < FIRST_CODE {
            Ok(code)
        } else {
            Err(LzwError::corrupt(format!(
                "expected a literal, found code {code}"
            )))
        }
    }

    fn run<S, D>(
        &mut self,
        source: &mut S,
        sink: &mut D,
        reader: &mut MsbCodeReader,
        window: &mut Window,
    ) -> Result<()>
    where
        S: ByteSource,
        D: ByteSink,
    {
        if window.is_full() {
            return Ok(());
        }

        let end_code = self.config.end_code();
        let flush_code = self.config.flush_code();
        let max_code = self.config.max_code();

        let first = reader.get_code(source)?;
        if first == end_code {
            return Ok(());
        }
        let mut old_code = self.literal(first)?;
        let mut first_char = old_code as u8;
        if !window.emit(sink, first_char)? {
            return Ok(());
        }

        let mut next_code = FIRST_CODE;

        loop {
            let code = reader.get_code(source)?;
            if code == end_code {
                return Ok(());
            }

            if code == flush_code {
                next_code = FIRST_CODE;
                old_code = self.literal(reader.get_code(source)?)?;
                first_char = old_code as u8;
                if !window.emit(sink, first_char)? {
                    return Ok(());
                }
                continue;
            }

            let string = if code < next_code {
                self.table.decode(code)?
            } else if code == next_code {
                self.table.decode_pending(old_code, first_char)?
            } else {
                return Err(LzwError::InvalidCode { code, next_code });
            };

            // The stack holds the string back to front.
            let head = string[string.len() - 1];
            for &byte in string.iter().rev() {
                if !window.emit(sink, byte)? {
                    return Ok(());
                }
            }

            if next_code <= max_code {
                self.table.set(next_code, old_code, head);
                next_code += 1;
            }
            old_code = code;
            first_char = head;
        }
    }
}
