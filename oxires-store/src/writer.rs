//! Writing resource payloads into a resource file.

use crate::descriptor::{OFFSET_PENDING, ResFlags, ResourceId, ResourceInfo};
use crate::error::{Result, StoreError};
use oxires_core::{SliceSource, VecSink};
use oxires_lzw::{LzwConfig, LzwEncoder, LzwError};
use std::io::{self, Seek, Write};
use tracing::debug;

/// A payload written by [`PayloadWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedResource {
    /// Descriptor data to register with the store.
    pub info: ResourceInfo,
    /// Bytes the payload occupies in the file.
    pub stored_size: usize,
}

/// Appends resource payloads to a resource file.
///
/// Compound headers are written as they are. Bodies flagged
/// [`ResFlags::LZW`] are compressed, unless compression would not make
/// them smaller; the flag is then cleared and the body stored raw.
pub struct PayloadWriter<W: Write + Seek> {
    writer: W,
    file_num: u8,
    config: LzwConfig,
    encoder: Option<LzwEncoder>,
}

impl<W: Write + Seek> PayloadWriter<W> {
    /// Create a writer for resource file `file_num`.
    pub fn new(writer: W, file_num: u8) -> Self {
        Self::with_config(writer, file_num, LzwConfig::RESOURCE)
    }

    /// Create a writer compressing with `config`.
    pub fn with_config(writer: W, file_num: u8, config: LzwConfig) -> Self {
        Self {
            writer,
            file_num,
            config,
            encoder: None,
        }
    }

    /// Append one payload at the current stream position.
    pub fn write(
        &mut self,
        id: ResourceId,
        data: &[u8],
        mut flags: ResFlags,
        type_tag: u8,
    ) -> Result<PackedResource> {
        let size = u32::try_from(data.len())
            .map_err(|_| io::Error::other(format!("resource {id} exceeds 4 GiB")))?;

        let header = if flags.contains(ResFlags::COMPOUND) {
            compound_header_len(id, data)?
        } else {
            0
        };
        let (head, body) = data.split_at(header);

        let mut position = self.writer.stream_position()?;
        if position == u64::from(OFFSET_PENDING) {
            // Offset 1 reads as "not written yet".
            self.writer.write_all(&[0])?;
            position += 1;
        }
        let offset = u32::try_from(position)
            .map_err(|_| io::Error::other("resource file exceeds 4 GiB"))?;

        self.writer.write_all(head)?;
        let mut stored_size = head.len();

        let compressed = if flags.contains(ResFlags::LZW) {
            self.compress(body)?
        } else {
            None
        };
        match compressed {
            Some(packed) => {
                self.writer.write_all(&packed)?;
                stored_size += packed.len();
            }
            None => {
                flags.remove(ResFlags::LZW);
                self.writer.write_all(body)?;
                stored_size += body.len();
            }
        }

        debug!(%id, size, offset, stored_size, flags = flags.bits(), "payload written");
        Ok(PackedResource {
            info: ResourceInfo {
                size,
                offset,
                file_num: self.file_num,
                flags,
                type_tag,
            },
            stored_size,
        })
    }

    /// Compress `body`, or `None` when that would not save space.
    fn compress(&mut self, body: &[u8]) -> Result<Option<Vec<u8>>> {
        let encoder = match &mut self.encoder {
            Some(encoder) => encoder,
            slot => slot.insert(LzwEncoder::new(self.config)?),
        };
        let mut sink = VecSink::with_capacity(body.len());
        match encoder.compress(SliceSource::new(body), body.len(), &mut sink, body.len()) {
            Ok(written) if written < body.len() => Ok(Some(sink.into_inner())),
            Ok(_) | Err(LzwError::Overflow { .. }) => {
                debug!(len = body.len(), "payload does not compress, storing raw");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Current position in the output.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.writer.stream_position()?)
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Size of the reference table at the front of compound `data`.
fn compound_header_len(id: ResourceId, data: &[u8]) -> Result<usize> {
    let [lo, hi, ..] = *data else {
        return Err(StoreError::HeaderOverrun {
            id,
            header: 2,
            size: data.len(),
        });
    };
    let header = ResourceInfo::ref_table_size(u16::from_le_bytes([lo, hi]));
    if header > data.len() {
        return Err(StoreError::HeaderOverrun {
            id,
            header,
            size: data.len(),
        });
    }
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_raw_payloads_back_to_back() {
        let mut writer = PayloadWriter::new(Cursor::new(Vec::new()), 2);
        writer.write_all_prefix(b"HDR!");

        let a = writer
            .write(ResourceId(3), b"first", ResFlags::NONE, 7)
            .unwrap();
        let b = writer
            .write(ResourceId(4), b"second", ResFlags::NONE, 7)
            .unwrap();

        assert_eq!(a.info.offset, 4);
        assert_eq!(a.info.file_num, 2);
        assert_eq!(a.info.type_tag, 7);
        assert_eq!(b.info.offset, 9);
        assert_eq!(b.stored_size, 6);

        let file = writer.into_inner().unwrap().into_inner();
        assert_eq!(file, b"HDR!firstsecond");
    }

    #[test]
    fn test_lzw_kept_when_smaller() {
        let data = vec![b'A'; 300];
        let mut writer = PayloadWriter::new(Cursor::new(Vec::new()), 0);
        writer.write_all_prefix(b"HDR!");
        let packed = writer
            .write(ResourceId(3), &data, ResFlags::LZW, 0)
            .unwrap();

        assert!(packed.info.flags.contains(ResFlags::LZW));
        assert_eq!(packed.info.size, 300);
        assert!(packed.stored_size < 60);
    }

    #[test]
    fn test_lzw_dropped_when_larger() {
        let data = b"abcdefgh";
        let mut writer = PayloadWriter::new(Cursor::new(Vec::new()), 0);
        writer.write_all_prefix(b"HDR!");
        let packed = writer
            .write(ResourceId(3), data, ResFlags::LZW, 0)
            .unwrap();

        assert!(!packed.info.flags.contains(ResFlags::LZW));
        assert_eq!(packed.stored_size, 8);
    }

    #[test]
    fn test_skips_pending_offset() {
        let mut writer = PayloadWriter::new(Cursor::new(Vec::new()), 0);
        writer.write_all_prefix(b"X");
        let packed = writer
            .write(ResourceId(3), b"data", ResFlags::NONE, 0)
            .unwrap();
        assert_eq!(packed.info.offset, 2);
    }

    #[test]
    fn test_compound_header_checked() {
        let mut writer = PayloadWriter::new(Cursor::new(Vec::new()), 0);
        // Claims 4 references: needs 22 header bytes.
        let data = [4u8, 0, 0, 0, 0, 0];
        assert!(matches!(
            writer.write(ResourceId(3), &data, ResFlags::COMPOUND, 0),
            Err(StoreError::HeaderOverrun { header: 22, size: 6, .. })
        ));
        assert!(matches!(
            writer.write(ResourceId(3), &[1], ResFlags::COMPOUND, 0),
            Err(StoreError::HeaderOverrun { header: 2, size: 1, .. })
        ));
    }

    impl<W: Write + Seek> PayloadWriter<W> {
        fn write_all_prefix(&mut self, bytes: &[u8]) {
            self.writer.write_all(bytes).unwrap();
        }
    }
}
