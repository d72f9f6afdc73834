//! LZW encoder (compression).

use crate::bitstream_msb::MsbCodeWriter;
use crate::config::{FIRST_CODE, LzwConfig};
use crate::dictionary::EncodeTable;
use crate::error::{LzwError, Result};
use crate::session::bracket;
use oxires_core::{ByteSink, ByteSource, SliceSource, VecSink};
use tracing::{debug, trace, warn};

/// LZW encoder for compression.
///
/// An encoder owns its hash table, so it can be created once and reused
/// for any number of [`compress`](Self::compress) calls. Separate encoders
/// share nothing and may run on different threads.
#[derive(Debug)]
pub struct LzwEncoder {
    config: LzwConfig,
    table: EncodeTable,
    /// FLUSH codes emitted by the last call.
    flushes: u32,
}

impl LzwEncoder {
    /// Create a new LZW encoder with the given configuration.
    pub fn new(config: LzwConfig) -> Result<Self> {
        config.validate()?;
        let table = EncodeTable::new(&config)?;
        Ok(Self {
            config,
            table,
            flushes: 0,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &LzwConfig {
        &self.config
    }

    /// Number of FLUSH codes emitted by the most recent call.
    pub fn flush_count(&self) -> u32 {
        self.flushes
    }

    /// Compress `source_len` bytes from `source` into `sink`.
    ///
    /// # Algorithm
    ///
    /// 1. The current match starts as the first input byte.
    /// 2. For every further byte, look up `(match, byte)` in the table.
    ///    A hit extends the match.
    /// 3. On a miss the match's code is emitted and the byte starts a new
    ///    match. While codes remain, `(match, byte)` gets the next code.
    /// 4. Once the table is full, misses are counted; after
    ///    `flush_pause` of them a FLUSH code is emitted and the table
    ///    starts over from code 256.
    /// 5. At the end the match, the END code and a zero padding code are
    ///    emitted.
    ///
    /// # Returns
    ///
    /// The number of compressed bytes written. If that number would exceed
    /// `sink_max`, compression stops with [`LzwError::Overflow`]; both
    /// channels are still closed.
    pub fn compress<S, D>(
        &mut self,
        mut source: S,
        source_len: usize,
        mut sink: D,
        sink_max: usize,
    ) -> Result<usize>
    where
        S: ByteSource,
        D: ByteSink,
    {
        let mut writer = MsbCodeWriter::new(self.config.code_bits, sink_max);
        self.flushes = 0;

        let result = bracket(&mut source, &mut sink, |source, sink| {
            self.run(source, source_len, sink, &mut writer)
        });

        match result {
            Ok(()) => {
                debug!(
                    input = source_len,
                    output = writer.written(),
                    flushes = self.flushes,
                    "LZW compress finished"
                );
                Ok(writer.written())
            }
            Err(e) => {
                if matches!(e, LzwError::Overflow { .. }) {
                    warn!(input = source_len, limit = sink_max, "LZW compress overflow");
                }
                Err(e)
            }
        }
    }

    /// Compress a byte slice into a new vector.
    pub fn encode(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut sink = VecSink::with_capacity(input.len() / 2 + 8);
        self.compress(SliceSource::new(input), input.len(), &mut sink, usize::MAX)?;
        Ok(sink.into_inner())
    }

    fn run<S, D>(
        &mut self,
        source: &mut S,
        source_len: usize,
        sink: &mut D,
        writer: &mut MsbCodeWriter,
    ) -> Result<()>
    where
        S: ByteSource,
        D: ByteSink,
    {
        let max_code = self.config.max_code();
        let stale_at = max_code + self.config.flush_pause;

        self.table.clear();
        let mut next_code = FIRST_CODE;

        if source_len > 0 {
            let mut string_code = u32::from(source.next_byte()?);

            for _ in 1..source_len {
                let ch = source.next_byte()?;
                let slot = self.table.find_slot(string_code, ch);

                if let Some(code) = self.table.code_at(slot) {
                    string_code = code;
                    continue;
                }

                if next_code <= max_code {
                    self.table.insert(slot, next_code, string_code, ch);
                    next_code += 1;
                    writer.put_code(sink, string_code)?;
                } else if next_code > stale_at {
                    writer.put_code(sink, string_code)?;
                    writer.put_code(sink, self.config.flush_code())?;
                    self.table.clear();
                    next_code = FIRST_CODE;
                    self.flushes += 1;
                    trace!(output = writer.written(), "LZW dictionary flushed");
                } else {
                    // Full table: no new entry, but the miss counts toward
                    // the flush pause.
                    next_code += 1;
                    writer.put_code(sink, string_code)?;
                }
                string_code = u32::from(ch);
            }

            writer.put_code(sink, string_code)?;
        }

        writer.put_code(sink, self.config.end_code())?;
        writer.put_code(sink, 0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::LzwDecoder;
    use oxires_core::{DiscardSink, OxiResError};

    /// Sink that records its lifecycle.
    #[derive(Default)]
    struct TrackingSink {
        data: Vec<u8>,
        opened: u32,
        closed: u32,
    }

    impl ByteSink for TrackingSink {
        fn open(&mut self) -> oxires_core::Result<()> {
            self.opened += 1;
            Ok(())
        }

        fn put_byte(&mut self, byte: u8) -> oxires_core::Result<()> {
            self.data.push(byte);
            Ok(())
        }

        fn close(&mut self) -> oxires_core::Result<()> {
            self.closed += 1;
            Ok(())
        }
    }

    fn roundtrip(config: LzwConfig, original: &[u8]) -> Vec<u8> {
        let mut encoder = LzwEncoder::new(config).unwrap();
        let compressed = encoder.encode(original).unwrap();
        let mut decoder = LzwDecoder::new(config).unwrap();
        decoder.decode(&compressed).unwrap()
    }

    #[test]
    fn test_encode_simple() {
        let original = b"TOBEORNOTTOBEORTOBEORNOT";
        let mut encoder = LzwEncoder::new(LzwConfig::RESOURCE).unwrap();
        let compressed = encoder.encode(original).unwrap();

        // 14-bit codes make short inputs larger, but not by much.
        assert!(compressed.len() < original.len() * 2);
        assert_eq!(roundtrip(LzwConfig::RESOURCE, original), original);
    }

    #[test]
    fn test_encode_empty() {
        let mut encoder = LzwEncoder::new(LzwConfig::RESOURCE).unwrap();
        let compressed = encoder.encode(b"").unwrap();

        // END (14 bits) plus the padding code: 28 bits, 3 whole bytes.
        assert_eq!(compressed, vec![0xFF, 0xFC, 0x00]);
        assert!(roundtrip(LzwConfig::RESOURCE, b"").is_empty());
    }

    #[test]
    fn test_encode_single_byte() {
        let mut encoder = LzwEncoder::new(LzwConfig::RESOURCE).unwrap();
        let compressed = encoder.encode(b"A").unwrap();

        // 'A', END, padding: 42 bits, 5 whole bytes.
        assert_eq!(compressed.len(), 5);
        assert_eq!(roundtrip(LzwConfig::RESOURCE, b"A"), b"A");
    }

    #[test]
    fn test_encode_run_of_300() {
        let original = vec![b'A'; 300];
        let mut encoder = LzwEncoder::new(LzwConfig::RESOURCE).unwrap();
        let compressed = encoder.encode(&original).unwrap();

        assert!(
            compressed.len() < 60,
            "300-byte run compressed to {} bytes",
            compressed.len()
        );
        assert_eq!(roundtrip(LzwConfig::RESOURCE, &original), original);
    }

    #[test]
    fn test_encode_all_bytes() {
        let original: Vec<u8> = (0..=255).collect();
        assert_eq!(roundtrip(LzwConfig::RESOURCE, &original), original);
    }

    #[test]
    fn test_overflow_closes_channels() {
        let original: Vec<u8> = (0..=255).cycle().take(4096).collect();
        let mut encoder = LzwEncoder::new(LzwConfig::RESOURCE).unwrap();

        let mut sink = TrackingSink::default();
        let err = encoder
            .compress(SliceSource::new(&original), original.len(), &mut sink, 100)
            .unwrap_err();

        assert!(matches!(err, LzwError::Overflow { limit: 100 }));
        assert_eq!(sink.opened, 1);
        assert_eq!(sink.closed, 1);
        assert_eq!(sink.data.len(), 100);
    }

    #[test]
    fn test_exact_limit_is_not_overflow() {
        let original = b"abcabcabcabcabc";
        let mut encoder = LzwEncoder::new(LzwConfig::RESOURCE).unwrap();
        let size = encoder.encode(original).unwrap().len();

        let mut sink = VecSink::new();
        let written = encoder
            .compress(SliceSource::new(original), original.len(), &mut sink, size)
            .unwrap();
        assert_eq!(written, size);

        let err = encoder
            .compress(
                SliceSource::new(original),
                original.len(),
                VecSink::new(),
                size - 1,
            )
            .unwrap_err();
        assert!(matches!(err, LzwError::Overflow { .. }));
    }

    #[test]
    fn test_short_source_is_reported() {
        let mut encoder = LzwEncoder::new(LzwConfig::RESOURCE).unwrap();
        let err = encoder
            .compress(SliceSource::new(b"abc"), 10, DiscardSink::new(), usize::MAX)
            .unwrap_err();
        assert!(matches!(
            err,
            LzwError::Channel(OxiResError::UnexpectedEof { position: 3 })
        ));
    }

    #[test]
    fn test_flush_after_pause() {
        let config = LzwConfig::new(9).unwrap().with_flush_pause(16);
        let mut encoder = LzwEncoder::new(config).unwrap();

        let mut seed: u32 = 0x1234_5678;
        let original: Vec<u8> = (0..20_000)
            .map(|_| {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (seed >> 16) as u8
            })
            .collect();

        let compressed = encoder.encode(&original).unwrap();
        assert!(encoder.flush_count() >= 1);

        let mut decoder = LzwDecoder::new(config).unwrap();
        assert_eq!(decoder.decode(&compressed).unwrap(), original);
    }

    #[test]
    fn test_encoder_reuse() {
        let mut encoder = LzwEncoder::new(LzwConfig::RESOURCE).unwrap();
        let first = encoder.encode(b"ABABABABABAB").unwrap();
        let _ = encoder.encode(b"something else entirely").unwrap();
        let again = encoder.encode(b"ABABABABABAB").unwrap();
        assert_eq!(first, again);
    }
}
