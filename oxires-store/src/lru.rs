//! The LRU ring threaded through the descriptor table.
//!
//! Links are table indices, not pointers. Two sentinel descriptors close
//! the ring: [`ResourceId::HEAD`] precedes the least recently used entry
//! and [`ResourceId::TAIL`] follows the most recently used one. An empty
//! ring is `HEAD <-> TAIL`.
//!
//! [`unlink`], [`append_at_tail`] and [`touch`] are the only code that
//! writes links.

use crate::descriptor::{ResourceDescriptor, ResourceId};

const NULL: u16 = ResourceId::NULL.0;
const HEAD: usize = ResourceId::HEAD.0 as usize;
const TAIL: usize = ResourceId::TAIL.0 as usize;

/// Previous/next indices of a descriptor in the LRU ring.
#[derive(Debug)]
pub(crate) struct LruLinks {
    prev: u16,
    next: u16,
}

impl LruLinks {
    pub(crate) fn unlinked() -> Self {
        Self {
            prev: NULL,
            next: NULL,
        }
    }

    pub(crate) fn is_linked(&self) -> bool {
        self.next != NULL
    }
}

/// Close the ring over the two sentinels.
pub(crate) fn init(entries: &mut [ResourceDescriptor]) {
    entries[HEAD].links = LruLinks {
        prev: TAIL as u16,
        next: TAIL as u16,
    };
    entries[TAIL].links = LruLinks {
        prev: HEAD as u16,
        next: HEAD as u16,
    };
}

/// Take `index` out of the ring.
pub(crate) fn unlink(entries: &mut [ResourceDescriptor], index: usize) {
    debug_assert!(index > TAIL, "sentinels stay in the ring");
    let LruLinks { prev, next } =
        std::mem::replace(&mut entries[index].links, LruLinks::unlinked());
    debug_assert!(next != NULL, "unlinking a descriptor outside the ring");
    entries[usize::from(prev)].links.next = next;
    entries[usize::from(next)].links.prev = prev;
}

/// Insert `index` just before the tail sentinel.
pub(crate) fn append_at_tail(entries: &mut [ResourceDescriptor], index: usize) {
    debug_assert!(index > TAIL, "sentinels stay in the ring");
    debug_assert!(
        !entries[index].links.is_linked(),
        "descriptor already in the ring"
    );
    let last = entries[TAIL].links.prev;
    // Indices always fit: the table never outgrows the id space.
    let this = index as u16;
    entries[index].links = LruLinks {
        prev: last,
        next: TAIL as u16,
    };
    entries[usize::from(last)].links.next = this;
    entries[TAIL].links.prev = this;
}

/// Mark `index` as most recently used.
pub(crate) fn touch(entries: &mut [ResourceDescriptor], index: usize) {
    if usize::from(entries[index].links.next) != TAIL {
        unlink(entries, index);
        append_at_tail(entries, index);
    }
}

/// Walks the ring from least to most recently used.
pub struct LruIter<'a> {
    entries: &'a [ResourceDescriptor],
    cursor: u16,
}

impl<'a> LruIter<'a> {
    pub(crate) fn new(entries: &'a [ResourceDescriptor]) -> Self {
        Self {
            entries,
            cursor: entries[HEAD].links.next,
        }
    }
}

impl Iterator for LruIter<'_> {
    type Item = ResourceId;

    fn next(&mut self) -> Option<ResourceId> {
        let current = usize::from(self.cursor);
        if current == TAIL || current == usize::from(NULL) {
            return None;
        }
        self.cursor = self.entries[current].links.next;
        Some(ResourceId(current as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(len: usize) -> Vec<ResourceDescriptor> {
        let mut entries: Vec<_> = (0..len).map(|_| ResourceDescriptor::empty()).collect();
        init(&mut entries);
        entries
    }

    fn order(entries: &[ResourceDescriptor]) -> Vec<u16> {
        LruIter::new(entries).map(|id| id.0).collect()
    }

    /// Walk backwards from the tail and check it mirrors the forward walk.
    fn assert_consistent(entries: &[ResourceDescriptor]) {
        let forward = order(entries);
        let mut backward = Vec::new();
        let mut cursor = usize::from(entries[TAIL].links.prev);
        while cursor != HEAD {
            backward.push(cursor as u16);
            cursor = usize::from(entries[cursor].links.prev);
        }
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(usize::from(entries[HEAD].links.prev), TAIL);
        assert_eq!(usize::from(entries[TAIL].links.next), HEAD);
    }

    #[test]
    fn test_empty_ring() {
        let entries = ring(8);
        assert!(order(&entries).is_empty());
        assert_consistent(&entries);
    }

    #[test]
    fn test_append_and_touch() {
        let mut entries = ring(8);
        for i in 3..7 {
            append_at_tail(&mut entries, i);
        }
        assert_eq!(order(&entries), vec![3, 4, 5, 6]);

        touch(&mut entries, 4);
        assert_eq!(order(&entries), vec![3, 5, 6, 4]);

        // Already most recent: nothing moves.
        touch(&mut entries, 4);
        assert_eq!(order(&entries), vec![3, 5, 6, 4]);
        assert_consistent(&entries);
    }

    #[test]
    fn test_unlink_ends_and_middle() {
        let mut entries = ring(8);
        for i in 3..8 {
            append_at_tail(&mut entries, i);
        }
        unlink(&mut entries, 3);
        unlink(&mut entries, 7);
        unlink(&mut entries, 5);
        assert_eq!(order(&entries), vec![4, 6]);
        assert!(!entries[5].links.is_linked());
        assert_consistent(&entries);

        unlink(&mut entries, 4);
        unlink(&mut entries, 6);
        assert!(order(&entries).is_empty());
        assert_consistent(&entries);
    }
}
