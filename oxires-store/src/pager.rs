//! Memory provisioning for resident resources.

use crate::descriptor::ResourceId;
use tracing::warn;

/// Supplies the buffers resources are loaded into.
///
/// The store calls [`Pager::allocate`] once per load with the id of the
/// resource being materialized, and hands buffers back through
/// [`Pager::release`] when a resource leaves memory.
pub trait Pager {
    /// Allocate a zeroed buffer of exactly `size` bytes for `id`.
    ///
    /// Returns `None` when the memory cannot be provided.
    fn allocate(&mut self, id: ResourceId, size: usize) -> Option<Box<[u8]>>;

    /// Take back the buffer of a resource that was dropped or paged out.
    fn release(&mut self, _id: ResourceId, _data: Box<[u8]>) {}
}

impl<P: Pager + ?Sized> Pager for &mut P {
    fn allocate(&mut self, id: ResourceId, size: usize) -> Option<Box<[u8]>> {
        (**self).allocate(id, size)
    }

    fn release(&mut self, id: ResourceId, data: Box<[u8]>) {
        (**self).release(id, data)
    }
}

/// Pager backed by the global allocator, with an optional byte budget.
#[derive(Debug, Default)]
pub struct HeapPager {
    budget: Option<usize>,
    in_use: usize,
}

impl HeapPager {
    /// Pager without a budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pager that refuses allocations past `budget` bytes in use.
    pub fn with_budget(budget: usize) -> Self {
        Self {
            budget: Some(budget),
            in_use: 0,
        }
    }

    /// Bytes handed out and not yet released.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Configured budget, if any.
    pub fn budget(&self) -> Option<usize> {
        self.budget
    }
}

impl Pager for HeapPager {
    fn allocate(&mut self, id: ResourceId, size: usize) -> Option<Box<[u8]>> {
        let in_use = self.in_use.checked_add(size)?;
        if self.budget.is_some_and(|budget| in_use > budget) {
            warn!(%id, size, in_use = self.in_use, "pager budget exhausted");
            return None;
        }

        let mut buf = Vec::new();
        if buf.try_reserve_exact(size).is_err() {
            warn!(%id, size, "allocation failed");
            return None;
        }
        buf.resize(size, 0);
        self.in_use = in_use;
        Some(buf.into_boxed_slice())
    }

    fn release(&mut self, _id: ResourceId, data: Box<[u8]>) {
        self.in_use = self.in_use.saturating_sub(data.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded() {
        let mut pager = HeapPager::new();
        let buf = pager.allocate(ResourceId(3), 1024).unwrap();
        assert_eq!(buf.len(), 1024);
        assert!(buf.iter().all(|&b| b == 0));
        assert_eq!(pager.in_use(), 1024);

        pager.release(ResourceId(3), buf);
        assert_eq!(pager.in_use(), 0);
    }

    #[test]
    fn test_budget() {
        let mut pager = HeapPager::with_budget(100);
        let a = pager.allocate(ResourceId(3), 60).unwrap();
        assert!(pager.allocate(ResourceId(4), 50).is_none());

        pager.release(ResourceId(3), a);
        assert!(pager.allocate(ResourceId(4), 50).is_some());
    }

    #[test]
    fn test_zero_size() {
        let mut pager = HeapPager::with_budget(0);
        let buf = pager.allocate(ResourceId(3), 0).unwrap();
        assert!(buf.is_empty());
    }
}
