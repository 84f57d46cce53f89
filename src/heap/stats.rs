//! Reports produced by [`Heap`](super::Heap) queries and compaction.

use crate::blocklist::BlockList;
use crate::error::{HeapError, HeapResult};

/// A snapshot of how the region is divided between the free and the allocated set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    pub allocated_size: usize,
    pub allocated_count: usize,
    pub free_size: usize,
    pub free_count: usize,
    /// `0` when there are no free blocks.
    pub largest_free: usize,
    /// The heap capacity when there are no free blocks.
    pub smallest_free: usize,
}

impl Statistics {
    pub(super) fn gather(capacity: usize, free: &BlockList, allocated: &BlockList) -> Self {
        let (largest_free, smallest_free) = free
            .iter()
            .fold((0, capacity), |(largest, smallest), b| {
                (largest.max(b.length()), smallest.min(b.length()))
            });

        Statistics {
            allocated_size: allocated.total_length(),
            allocated_count: allocated.len(),
            free_size: free.total_length(),
            free_count: free.len(),
            largest_free,
            smallest_free,
        }
    }
}

/// Address translations performed by a compaction pass.
///
/// `before()[i]` and `after()[i]` are the old and new address of the same allocation,
/// listed in ascending address order. Every live allocation is listed, including
/// the ones that didn't move. Patching client-held addresses is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compaction {
    before: Vec<usize>,
    after: Vec<usize>,
}

impl Compaction {
    pub(super) fn with_capacity(count: usize) -> Self {
        Compaction {
            before: Vec::with_capacity(count),
            after: Vec::with_capacity(count),
        }
    }

    /// Records that the allocation at `before` now lives at `after`.
    /// Allocations must be recorded in ascending `before` order.
    pub(super) fn record(&mut self, before: usize, after: usize) {
        debug_assert!(
            self.before.last().map_or(true, |&last| last < before),
            "Relocations should be recorded in ascending address order."
        );
        debug_assert!(after <= before, "Allocations only ever move downwards.");
        self.before.push(before);
        self.after.push(after);
    }

    /// Old addresses, ascending.
    #[inline]
    pub fn before(&self) -> &[usize] {
        &self.before
    }

    /// New addresses, in the same order as [`before`](Compaction::before).
    #[inline]
    pub fn after(&self) -> &[usize] {
        &self.after
    }

    /// Returns the number of allocations visited by the pass.
    #[inline]
    pub fn count(&self) -> usize {
        debug_assert_eq!(self.before.len(), self.after.len());
        self.before.len()
    }

    /// Iterates over `(before, after)` address pairs.
    pub fn relocations(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.before.iter().copied().zip(self.after.iter().copied())
    }

    /// Returns the new address of the allocation that used to start at `before`.
    pub fn translate(&self, before: usize) -> Option<usize> {
        // `before` is sorted ascending.
        let index = self.before.binary_search(&before).ok()?;
        Some(self.after[index])
    }

    /// Copies the translations into caller-provided buffers and returns how many were written.
    pub fn write_into(&self, before: &mut [usize], after: &mut [usize]) -> HeapResult<usize> {
        let required = self.count();
        let provided = before.len().min(after.len());
        if provided < required {
            return Err(HeapError::OutputCapacityExceeded { required, provided });
        }
        before[..required].copy_from_slice(&self.before);
        after[..required].copy_from_slice(&self.after);
        Ok(required)
    }
}
