//! The resource store: descriptors, attached files and resident data.

use crate::descriptor::{
    OFFSET_PENDING, ResFlags, ResourceDescriptor, ResourceId, ResourceInfo,
};
use crate::error::{Result, StoreError};
use crate::pager::{HeapPager, Pager};
use crate::table::{DEFAULT_GROW_STEP, DescriptorTable};
use oxires_core::channel::DEFAULT_BLOCK_SIZE;
use oxires_core::{BlockSource, SliceSink};
use oxires_lzw::{LzwConfig, LzwDecoder};
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, warn};

/// Store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Descriptors added per table growth.
    pub grow_step: usize,
    /// Read-ahead of the block source compressed payloads expand from.
    pub block_size: usize,
    /// Codec parameters of compressed payloads.
    pub lzw: LzwConfig,
}

impl StoreConfig {
    /// Set the table growth step.
    pub fn with_grow_step(mut self, grow_step: usize) -> Self {
        self.grow_step = grow_step;
        self
    }

    /// Set the read-ahead block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            grow_step: DEFAULT_GROW_STEP,
            block_size: DEFAULT_BLOCK_SIZE,
            lzw: LzwConfig::RESOURCE,
        }
    }
}

/// Resources backed by seekable resource files, loaded on demand and
/// evicted least recently used first.
///
/// Resident, unlocked resources sit in the LRU ring. Locking takes a
/// resource out of the ring so paging never touches it.
///
/// # Example
///
/// ```rust
/// use oxires_store::{ResFlags, ResourceId, ResourceInfo, ResourceStore};
/// use std::io::Cursor;
///
/// let file = Cursor::new(b"....hello".to_vec());
/// let mut store = ResourceStore::new();
/// store.attach_file(0, file);
/// store
///     .define(
///         ResourceId(3),
///         ResourceInfo {
///             size: 5,
///             offset: 4,
///             file_num: 0,
///             flags: ResFlags::NONE,
///             type_tag: 0,
///         },
///     )
///     .unwrap();
///
/// assert_eq!(store.get(ResourceId(3)).unwrap(), b"hello");
/// ```
pub struct ResourceStore<R, P = HeapPager> {
    table: DescriptorTable,
    files: Vec<Option<R>>,
    pager: P,
    config: StoreConfig,
    decoder: Option<LzwDecoder>,
}

impl<R: Read + Seek> ResourceStore<R, HeapPager> {
    /// Create a store with the default configuration and a heap pager.
    pub fn new() -> Self {
        Self::with_pager(StoreConfig::default(), HeapPager::new())
    }
}

impl<R: Read + Seek> Default for ResourceStore<R, HeapPager> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Read + Seek, P: Pager> ResourceStore<R, P> {
    /// Create a store allocating through `pager`.
    pub fn with_pager(config: StoreConfig, pager: P) -> Self {
        Self {
            table: DescriptorTable::new(config.grow_step),
            files: Vec::new(),
            pager,
            config,
            decoder: None,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The descriptor table.
    pub fn table(&self) -> &DescriptorTable {
        &self.table
    }

    /// The pager.
    pub fn pager(&self) -> &P {
        &self.pager
    }

    /// Attach a resource file, returning the one it replaces.
    pub fn attach_file(&mut self, file_num: u8, reader: R) -> Option<R> {
        let slot = usize::from(file_num);
        if self.files.len() <= slot {
            self.files.resize_with(slot + 1, || None);
        }
        debug!(file_num, "resource file attached");
        self.files[slot].replace(reader)
    }

    /// Detach a resource file. Resident copies of its resources stay loaded.
    pub fn detach_file(&mut self, file_num: u8) -> Option<R> {
        let reader = self.files.get_mut(usize::from(file_num))?.take();
        if reader.is_some() {
            debug!(file_num, "resource file detached");
        }
        reader
    }

    /// Register where a resource lives, growing the table as needed.
    ///
    /// A resident copy of the previous definition is evicted first.
    pub fn define(&mut self, id: ResourceId, info: ResourceInfo) -> Result<()> {
        if !id.is_resource() {
            return Err(StoreError::UnknownResource(id));
        }
        self.table.ensure(id);
        if self.table.get(id)?.lock_count > 0 {
            return Err(StoreError::Locked(id));
        }
        self.evict(id)?;
        self.table.get_mut(id)?.info = info;
        Ok(())
    }

    /// Descriptor of a resource.
    pub fn descriptor(&self, id: ResourceId) -> Result<&ResourceDescriptor> {
        self.table.get(id)
    }

    /// Read a resource's materialized form into the front of `buf`.
    ///
    /// A compound resource's reference table is copied verbatim ahead of
    /// its body; an LZW body is expanded. `buf` must hold at least the
    /// descriptor's size.
    pub fn retrieve(&mut self, id: ResourceId, buf: &mut [u8]) -> Result<()> {
        let info = self.table.get(id)?.info;
        if info.offset == OFFSET_PENDING {
            return Err(StoreError::OffsetPending(id));
        }

        let size = info.size as usize;
        if buf.len() < size {
            return Err(StoreError::BufferTooSmall {
                id,
                needed: size,
                available: buf.len(),
            });
        }

        let file = self
            .files
            .get_mut(usize::from(info.file_num))
            .and_then(Option::as_mut)
            .ok_or(StoreError::FileNotAttached(info.file_num))?;
        file.seek(SeekFrom::Start(u64::from(info.offset)))?;

        let buf = &mut buf[..size];
        let mut header = 0;
        if info.flags.contains(ResFlags::COMPOUND) {
            if size < 2 {
                return Err(StoreError::HeaderOverrun {
                    id,
                    header: 2,
                    size,
                });
            }
            file.read_exact(&mut buf[..2])?;
            header = ResourceInfo::ref_table_size(u16::from_le_bytes([buf[0], buf[1]]));
            if header > size {
                return Err(StoreError::HeaderOverrun { id, header, size });
            }
            file.read_exact(&mut buf[2..header])?;
        }

        let body = &mut buf[header..];
        let body_len = body.len();
        if info.flags.contains(ResFlags::LZW) {
            let mut decoder = match self.decoder.take() {
                Some(decoder) => decoder,
                None => LzwDecoder::new(self.config.lzw)?,
            };
            let source = BlockSource::with_capacity(self.config.block_size, &mut *file);
            let result = decoder.expand(source, SliceSink::new(body), 0, None);
            self.decoder = Some(decoder);

            let written = result?;
            if written != body_len {
                warn!(%id, expected = body_len, written, "short resource expansion");
                return Err(StoreError::SizeMismatch {
                    id,
                    expected: size,
                    actual: header + written,
                });
            }
        } else {
            file.read_exact(body)?;
        }

        debug!(
            %id,
            size,
            offset = info.offset,
            header,
            lzw = info.flags.contains(ResFlags::LZW),
            "resource retrieved"
        );
        Ok(())
    }

    /// Allocate a buffer of exactly the resource's size through the pager
    /// and retrieve the resource into it.
    ///
    /// Returns `Ok(None)` when the pager has no memory; nothing is read
    /// then. The buffer is handed to the caller and the ring is left
    /// alone.
    pub fn load(&mut self, id: ResourceId) -> Result<Option<Box<[u8]>>> {
        let size = self.table.get(id)?.info.size as usize;
        let Some(mut buf) = self.pager.allocate(id, size) else {
            warn!(%id, size, "no memory for resource");
            return Ok(None);
        };

        if let Err(e) = self.retrieve(id, &mut buf) {
            self.pager.release(id, buf);
            return Err(e);
        }
        debug!(%id, size, "resource loaded");
        Ok(Some(buf))
    }

    /// The resident copy of a resource, loaded if needed.
    ///
    /// The resource becomes the most recently used. If the pager is out of
    /// memory, least recently used resources are paged out to make room
    /// and the load is tried once more.
    pub fn get(&mut self, id: ResourceId) -> Result<&[u8]> {
        let desc = self.table.get(id)?;
        if desc.is_resident() {
            if desc.in_lru() {
                self.table.touch(id)?;
            }
        } else {
            let data = self.materialize(id)?;
            self.table.get_mut(id)?.data = Some(data);
            self.table.append_at_tail(id)?;
        }
        self.resident(id)
    }

    fn materialize(&mut self, id: ResourceId) -> Result<Box<[u8]>> {
        if let Some(data) = self.load(id)? {
            return Ok(data);
        }
        let size = self.table.get(id)?.info.size as usize;
        let freed = self.page_out(size);
        debug!(%id, size, freed, "retrying load after page-out");
        self.load(id)?.ok_or(StoreError::OutOfMemory { id, size })
    }

    fn resident(&self, id: ResourceId) -> Result<&[u8]> {
        Ok(self.table.get(id)?.data().unwrap_or_default())
    }

    /// Load a resource if needed and pin it in memory.
    pub fn lock(&mut self, id: ResourceId) -> Result<&[u8]> {
        self.get(id)?;
        let desc = self.table.get_mut(id)?;
        let was_unlocked = desc.lock_count == 0;
        desc.lock_count = desc
            .lock_count
            .checked_add(1)
            .ok_or(StoreError::TooManyLocks(id))?;
        if was_unlocked {
            self.table.unlink(id)?;
        }
        self.resident(id)
    }

    /// Release one lock. The last unlock makes the resource the most
    /// recently used.
    pub fn unlock(&mut self, id: ResourceId) -> Result<()> {
        let desc = self.table.get_mut(id)?;
        if desc.lock_count == 0 {
            return Err(StoreError::NotLocked(id));
        }
        desc.lock_count -= 1;
        if desc.lock_count == 0 && desc.is_resident() {
            self.table.append_at_tail(id)?;
        }
        Ok(())
    }

    /// Evict one resource. Returns whether it was resident.
    pub fn drop_resource(&mut self, id: ResourceId) -> Result<bool> {
        let desc = self.table.get(id)?;
        if desc.lock_count > 0 {
            return Err(StoreError::Locked(id));
        }
        let resident = desc.is_resident();
        self.evict(id)?;
        Ok(resident)
    }

    fn evict(&mut self, id: ResourceId) -> Result<usize> {
        if self.table.get(id)?.in_lru() {
            self.table.unlink(id)?;
        }
        let Some(data) = self.table.get_mut(id)?.data.take() else {
            return Ok(0);
        };
        let size = data.len();
        self.pager.release(id, data);
        debug!(%id, size, "resource evicted");
        Ok(size)
    }

    /// Evict least recently used resources until at least `bytes` were
    /// freed or the ring runs out. Resources flagged
    /// [`ResFlags::NO_DROP`] are skipped.
    ///
    /// Returns the number of bytes freed.
    pub fn page_out(&mut self, bytes: usize) -> usize {
        let victims: Vec<ResourceId> = self
            .table
            .lru_iter()
            .filter(|&id| {
                self.table
                    .get(id)
                    .is_ok_and(|desc| !desc.info.flags.contains(ResFlags::NO_DROP))
            })
            .collect();

        let mut freed = 0;
        for id in victims {
            if freed >= bytes {
                break;
            }
            match self.evict(id) {
                Ok(size) => freed += size,
                Err(e) => warn!(%id, error = %e, "page-out skipped resource"),
            }
        }
        debug!(requested = bytes, freed, "page-out finished");
        freed
    }

    /// Load every resource of `file_num` flagged
    /// [`ResFlags::LOAD_ON_OPEN`]. Returns how many were loaded.
    pub fn preload(&mut self, file_num: u8) -> Result<usize> {
        let ids: Vec<ResourceId> = self
            .table
            .ids()
            .filter(|&id| {
                self.table.get(id).is_ok_and(|desc| {
                    desc.info.file_num == file_num
                        && desc.info.flags.contains(ResFlags::LOAD_ON_OPEN)
                        && desc.info.offset != OFFSET_PENDING
                        && !desc.is_resident()
                })
            })
            .collect();

        for &id in &ids {
            self.get(id)?;
        }
        debug!(file_num, loaded = ids.len(), "preload finished");
        Ok(ids.len())
    }

    /// Total bytes held by resident resources.
    pub fn resident_bytes(&self) -> usize {
        self.table
            .ids()
            .filter_map(|id| self.table.get(id).ok()?.data().map(<[u8]>::len))
            .sum()
    }

    /// Free the decoder tables kept between retrievals. They are
    /// allocated again by the next compressed retrieval.
    pub fn release_codec_buffers(&mut self) {
        if self.decoder.take().is_some() {
            debug!("codec buffers released");
        }
    }

    /// Whether decoder tables are currently allocated.
    pub fn has_codec_buffers(&self) -> bool {
        self.decoder.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn raw(offset: u32, size: u32) -> ResourceInfo {
        ResourceInfo {
            size,
            offset,
            file_num: 0,
            flags: ResFlags::NONE,
            type_tag: 0,
        }
    }

    fn store_over(bytes: &[u8]) -> ResourceStore<Cursor<Vec<u8>>> {
        let mut store = ResourceStore::new();
        store.attach_file(0, Cursor::new(bytes.to_vec()));
        store
    }

    #[test]
    fn test_retrieve_raw() {
        let mut store = store_over(b"xxABCDEFyy");
        store.define(ResourceId(3), raw(2, 6)).unwrap();

        let mut buf = [0u8; 8];
        store.retrieve(ResourceId(3), &mut buf).unwrap();
        assert_eq!(&buf[..6], b"ABCDEF");
        assert_eq!(&buf[6..], &[0, 0]);
    }

    #[test]
    fn test_oversized_grow_step_counts_each_resource_once() {
        let config = StoreConfig::default().with_grow_step(100_000);
        let mut store = ResourceStore::with_pager(config, HeapPager::new());
        store.attach_file(0, Cursor::new(b"0123456789".to_vec()));
        store.define(ResourceId(3), raw(0, 4)).unwrap();
        store.define(ResourceId(u16::MAX), raw(4, 6)).unwrap();

        store.get(ResourceId(3)).unwrap();
        store.get(ResourceId(u16::MAX)).unwrap();
        assert_eq!(store.table().len(), 65536);
        assert_eq!(store.resident_bytes(), 10);
    }

    #[test]
    fn test_retrieve_rejects_pending_and_small_buffers() {
        let mut store = store_over(b"0123456789");
        store.define(ResourceId(3), raw(OFFSET_PENDING, 4)).unwrap();
        store.define(ResourceId(4), raw(4, 4)).unwrap();

        let mut buf = [0u8; 4];
        assert!(matches!(
            store.retrieve(ResourceId(3), &mut buf),
            Err(StoreError::OffsetPending(_))
        ));
        assert!(matches!(
            store.retrieve(ResourceId(4), &mut buf[..3]),
            Err(StoreError::BufferTooSmall {
                needed: 4,
                available: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_file() {
        let mut store: ResourceStore<Cursor<Vec<u8>>> = ResourceStore::new();
        let mut info = raw(4, 4);
        info.file_num = 2;
        store.define(ResourceId(3), info).unwrap();

        assert!(matches!(
            store.get(ResourceId(3)),
            Err(StoreError::FileNotAttached(2))
        ));
        assert!(!store.descriptor(ResourceId(3)).unwrap().is_resident());
    }

    #[test]
    fn test_get_touches() {
        let mut store = store_over(b"aabbcc");
        for (i, id) in [3u16, 4, 5].into_iter().enumerate() {
            store.define(ResourceId(id), raw(i as u32 * 2, 2)).unwrap();
        }
        store.get(ResourceId(3)).unwrap();
        store.get(ResourceId(4)).unwrap();
        store.get(ResourceId(5)).unwrap();
        assert_eq!(store.get(ResourceId(3)).unwrap(), b"aa");

        let order: Vec<_> = store.table().lru_iter().collect();
        assert_eq!(order, vec![ResourceId(4), ResourceId(5), ResourceId(3)]);
        assert_eq!(store.resident_bytes(), 6);
    }

    #[test]
    fn test_lock_pins() {
        let mut store = store_over(b"aabbcc");
        store.define(ResourceId(3), raw(0, 2)).unwrap();
        store.define(ResourceId(4), raw(2, 2)).unwrap();

        assert_eq!(store.lock(ResourceId(3)).unwrap(), b"aa");
        store.lock(ResourceId(3)).unwrap();
        store.get(ResourceId(4)).unwrap();
        assert!(!store.descriptor(ResourceId(3)).unwrap().in_lru());

        assert_eq!(store.page_out(usize::MAX), 2);
        assert!(store.descriptor(ResourceId(3)).unwrap().is_resident());
        assert!(matches!(
            store.drop_resource(ResourceId(3)),
            Err(StoreError::Locked(_))
        ));

        store.unlock(ResourceId(3)).unwrap();
        assert!(!store.descriptor(ResourceId(3)).unwrap().in_lru());
        store.unlock(ResourceId(3)).unwrap();
        assert!(store.descriptor(ResourceId(3)).unwrap().in_lru());
        assert!(matches!(
            store.unlock(ResourceId(3)),
            Err(StoreError::NotLocked(_))
        ));
        assert!(store.drop_resource(ResourceId(3)).unwrap());
    }

    #[test]
    fn test_define_evicts_previous_copy() {
        let mut store = store_over(b"aabbcc");
        store.define(ResourceId(3), raw(0, 2)).unwrap();
        store.get(ResourceId(3)).unwrap();

        store.define(ResourceId(3), raw(4, 2)).unwrap();
        assert!(!store.descriptor(ResourceId(3)).unwrap().is_resident());
        assert_eq!(store.get(ResourceId(3)).unwrap(), b"cc");
        assert_eq!(store.pager().in_use(), 2);
    }

    #[test]
    fn test_define_rejects_sentinels() {
        let mut store = store_over(b"");
        assert!(matches!(
            store.define(ResourceId::TAIL, raw(0, 0)),
            Err(StoreError::UnknownResource(_))
        ));
    }

    #[test]
    fn test_codec_buffers_reused() {
        let payload = oxires_lzw::compress_resource(b"compressed body").unwrap();
        let mut store = store_over(&payload);
        let mut info = raw(0, 15);
        info.flags = ResFlags::LZW;
        store.define(ResourceId(3), info).unwrap();

        assert!(!store.has_codec_buffers());
        assert_eq!(store.get(ResourceId(3)).unwrap(), b"compressed body");
        assert!(store.has_codec_buffers());

        store.release_codec_buffers();
        store.release_codec_buffers();
        assert!(!store.has_codec_buffers());

        store.drop_resource(ResourceId(3)).unwrap();
        assert_eq!(store.get(ResourceId(3)).unwrap(), b"compressed body");
    }
}
