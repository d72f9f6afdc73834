//! Growable descriptor table.

use crate::descriptor::{ResourceDescriptor, ResourceId};
use crate::error::{Result, StoreError};
use crate::lru::{self, LruIter};
use tracing::trace;

/// Default number of descriptors added whenever the table grows.
pub const DEFAULT_GROW_STEP: usize = 128;

/// One slot per possible id.
const MAX_SLOTS: usize = u16::MAX as usize + 1;

/// Descriptors indexed by [`ResourceId`], with the LRU ring threaded
/// through them.
#[derive(Debug)]
pub struct DescriptorTable {
    entries: Vec<ResourceDescriptor>,
    grow_step: usize,
}

impl DescriptorTable {
    /// Create a table holding one growth step of empty descriptors.
    pub fn new(grow_step: usize) -> Self {
        let grow_step = grow_step.max(ResourceId::FIRST.index());
        let mut table = Self {
            entries: Vec::new(),
            grow_step,
        };
        table.resize_to(grow_step.min(MAX_SLOTS));
        lru::init(&mut table.entries);
        table
    }

    /// Number of descriptor slots, sentinels included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no slots. Never true: the sentinels always exist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Grow in whole steps until `id` has a slot.
    pub fn ensure(&mut self, id: ResourceId) {
        let needed = id.index() + 1;
        if needed > self.entries.len() {
            let steps = needed.div_ceil(self.grow_step);
            let target = (steps * self.grow_step).min(MAX_SLOTS);
            self.resize_to(target);
        }
    }

    fn resize_to(&mut self, len: usize) {
        trace!(from = self.entries.len(), to = len, "growing descriptor table");
        self.entries.resize_with(len, ResourceDescriptor::empty);
    }

    /// Descriptor of a resource.
    pub fn get(&self, id: ResourceId) -> Result<&ResourceDescriptor> {
        if !id.is_resource() {
            return Err(StoreError::UnknownResource(id));
        }
        self.entries
            .get(id.index())
            .ok_or(StoreError::UnknownResource(id))
    }

    pub(crate) fn get_mut(&mut self, id: ResourceId) -> Result<&mut ResourceDescriptor> {
        if !id.is_resource() {
            return Err(StoreError::UnknownResource(id));
        }
        self.entries
            .get_mut(id.index())
            .ok_or(StoreError::UnknownResource(id))
    }

    /// Take a resource out of the LRU ring.
    pub fn unlink(&mut self, id: ResourceId) -> Result<()> {
        self.check_ring_member(id, true)?;
        lru::unlink(&mut self.entries, id.index());
        Ok(())
    }

    /// Put a resource into the LRU ring as the most recently used entry.
    pub fn append_at_tail(&mut self, id: ResourceId) -> Result<()> {
        self.check_ring_member(id, false)?;
        lru::append_at_tail(&mut self.entries, id.index());
        Ok(())
    }

    /// Mark a resource in the ring as the most recently used entry.
    pub fn touch(&mut self, id: ResourceId) -> Result<()> {
        self.check_ring_member(id, true)?;
        lru::touch(&mut self.entries, id.index());
        Ok(())
    }

    fn check_ring_member(&self, id: ResourceId, linked: bool) -> Result<()> {
        if self.get(id)?.in_lru() == linked {
            Ok(())
        } else {
            Err(StoreError::LruMembership { id, linked })
        }
    }

    /// Resources in the ring from least to most recently used.
    pub fn lru_iter(&self) -> LruIter<'_> {
        LruIter::new(&self.entries)
    }

    /// The least recently used resource in the ring.
    pub fn least_recent(&self) -> Option<ResourceId> {
        self.lru_iter().next()
    }

    /// Ids of every resource slot, resident or not.
    pub fn ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        (ResourceId::FIRST.index()..self.entries.len()).map(|i| ResourceId(i as u16))
    }
}

impl Default for DescriptorTable {
    fn default() -> Self {
        Self::new(DEFAULT_GROW_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_grows_in_steps() {
        let mut table = DescriptorTable::default();
        assert_eq!(table.len(), 128);

        table.ensure(ResourceId(127));
        assert_eq!(table.len(), 128);

        table.ensure(ResourceId(128));
        assert_eq!(table.len(), 256);

        table.ensure(ResourceId(1000));
        assert_eq!(table.len(), 1024);
    }

    #[test]
    fn test_grows_to_full_id_space() {
        let mut table = DescriptorTable::new(1000);
        table.ensure(ResourceId(u16::MAX));
        assert_eq!(table.len(), 65536);
        assert!(table.get(ResourceId(u16::MAX)).is_ok());
    }

    #[test]
    fn test_oversized_step_stays_in_id_space() {
        let mut table = DescriptorTable::new(100_000);
        assert_eq!(table.len(), 65536);
        table.ensure(ResourceId(u16::MAX));
        assert_eq!(table.len(), 65536);

        let ids: Vec<_> = table.ids().collect();
        assert_eq!(ids.len(), 65536 - 3);
        assert_eq!(ids.first(), Some(&ResourceId::FIRST));
        assert_eq!(ids.last(), Some(&ResourceId(u16::MAX)));
    }

    #[test]
    fn test_growth_keeps_ring() {
        let mut table = DescriptorTable::new(8);
        table.append_at_tail(ResourceId(5)).unwrap();
        table.append_at_tail(ResourceId(3)).unwrap();
        table.ensure(ResourceId(40));
        table.append_at_tail(ResourceId(40)).unwrap();

        let order: Vec<_> = table.lru_iter().collect();
        assert_eq!(order, vec![ResourceId(5), ResourceId(3), ResourceId(40)]);
    }

    #[test]
    fn test_rejects_reserved_and_unknown_ids() {
        let mut table = DescriptorTable::default();
        assert!(matches!(
            table.get(ResourceId::HEAD),
            Err(StoreError::UnknownResource(_))
        ));
        assert!(matches!(
            table.touch(ResourceId(500)),
            Err(StoreError::UnknownResource(_))
        ));
    }

    #[test]
    fn test_membership_checked() {
        let mut table = DescriptorTable::default();
        assert!(matches!(
            table.unlink(ResourceId(4)),
            Err(StoreError::LruMembership { linked: true, .. })
        ));
        table.append_at_tail(ResourceId(4)).unwrap();
        assert!(matches!(
            table.append_at_tail(ResourceId(4)),
            Err(StoreError::LruMembership { linked: false, .. })
        ));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Touch(u16),
        Evict(u16),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (3u16..24).prop_map(Op::Touch),
            (3u16..24).prop_map(Op::Evict),
        ]
    }

    proptest! {
        #[test]
        fn prop_ring_matches_model(ops in prop::collection::vec(op(), 0..200)) {
            let mut table = DescriptorTable::new(32);
            // Least recently used first.
            let mut model: Vec<u16> = Vec::new();

            for op in ops {
                match op {
                    Op::Touch(id) => {
                        if let Some(pos) = model.iter().position(|&m| m == id) {
                            model.remove(pos);
                            table.touch(ResourceId(id)).unwrap();
                        } else {
                            table.append_at_tail(ResourceId(id)).unwrap();
                        }
                        model.push(id);
                    }
                    Op::Evict(id) => {
                        if let Some(pos) = model.iter().position(|&m| m == id) {
                            model.remove(pos);
                            table.unlink(ResourceId(id)).unwrap();
                        }
                    }
                }

                let order: Vec<u16> = table.lru_iter().map(|id| id.0).collect();
                prop_assert_eq!(&order, &model);
                for id in 3u16..24 {
                    let linked = table.get(ResourceId(id)).unwrap().in_lru();
                    prop_assert_eq!(linked, model.contains(&id));
                }
            }
        }
    }
}
