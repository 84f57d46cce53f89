//! A heap managing a single fixed-size region.
//!
// For a general view of the heap's operational semantics see the [`crate`] level documentation.
//
// # Additional implementation notes
// ## Block bookkeeping
// The region is tiled by blocks, each of which is owned by exactly one of two lists:
// `free` or `allocated`. Descriptors live outside of the region, so the payload of an
// allocation is never touched by bookkeeping and compaction only has to move payload bytes.
//
// ## Ordering
// `free` is re-sorted by address after every mutation. Fit searches scan it in that order
// which makes first fit pick the lowest address and gives a deterministic tie-break for
// best and worst fit. `allocated` is kept in push order and only sorted by compaction.
//
// ## Invariants
// After every public operation the blocks of both lists tile `[0, capacity)` exactly and
// no two free blocks are contiguous. Debug builds verify this in `check_invariants`.

use core::fmt::{self, Debug};

use static_assertions::assert_impl_all;
use tracing::{debug, instrument, Level};

use crate::block::Block;
use crate::blocklist::BlockList;
use crate::error::{HeapError, HeapResult};
use crate::region::Region;
use crate::strategy::Strategy;

pub use self::stats::{Compaction, Statistics};

mod stats;

/// A heap simulator over a fixed-size region.
///
/// Addresses handed out by the heap are offsets from the start of the region.
/// The heap is a single-owner value: wrap it in a `Mutex` if it has to be shared.
pub struct Heap {
    region: Region,
    strategy: Strategy,
    free: BlockList,
    allocated: BlockList,
}

// Independent heaps may be handed to other threads.
assert_impl_all!(Heap: Send);

impl Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("capacity", &self.capacity())
            .field("strategy", &self.strategy)
            .field("free", &self.free.len())
            .field("allocated", &self.allocated.len())
            .finish()
    }
}

impl Heap {
    /// Creates a heap over a fresh zeroed region of `capacity` bytes.
    /// Initially the whole region is a single free block.
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidCapacity`] if `capacity` is zero.
    #[instrument(level = "info", err(Display, level = Level::ERROR))]
    pub fn new(capacity: usize, strategy: Strategy) -> HeapResult<Self> {
        if capacity == 0 {
            return Err(HeapError::InvalidCapacity);
        }

        let heap = Heap {
            region: Region::new(capacity),
            strategy,
            free: BlockList::with_block(Block::new(0, capacity)),
            allocated: BlockList::new(),
        };
        debug!(region = ?heap.region, "Heap initialized.");
        heap.check_invariants();
        Ok(heap)
    }

    /// Allocates `size` bytes and returns the address of the allocation.
    ///
    /// The free block chosen by the heap's [`Strategy`] is split: the allocation takes its
    /// low end and the remainder (if any) stays free.
    ///
    /// # Errors
    /// * [`HeapError::InvalidSize`] if `size` is zero.
    /// * [`HeapError::NoFit`] if no free block is long enough. This isn't fatal,
    ///   the request might succeed after a [`free`](Heap::free) or a [`compact`](Heap::compact).
    #[instrument(level = "info", ret(level = Level::INFO), err(Display, level = Level::WARN))]
    pub fn allocate(&mut self, size: usize) -> HeapResult<usize> {
        if size == 0 {
            return Err(HeapError::InvalidSize);
        }

        let Some(address) = self.free.find_fit(self.strategy, size).map(Block::address) else {
            debug!(
                available = self.available_memory(),
                "Couldn't find free block to accommodate request."
            );
            return Err(HeapError::NoFit { size });
        };
        debug!(address, "Found free block to accommodate request.");

        let Some(block) = self.free.take_front(address, size) else {
            unreachable!("The fit search only returns members long enough for the request.");
        };
        self.allocated.push_front(block);
        self.free.sort_by_address();

        self.check_invariants();
        Ok(address)
    }

    /// Releases the allocation starting at `address`.
    ///
    /// The block rejoins the free set and is merged with every contiguous free block.
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidFree`] if `address` doesn't start a live allocation,
    /// which covers double frees and addresses that were never handed out.
    #[instrument(level = "info", err(Display, level = Level::ERROR))]
    pub fn free(&mut self, address: usize) -> HeapResult<()> {
        let Some(block) = self.allocated.remove(address) else {
            return Err(HeapError::InvalidFree { address });
        };
        debug!(?block, "Returning block to the free set.");

        self.free.push_back(block);
        if let Some(merged) = self.free.coalesce(address) {
            debug!(?merged, "Free block after merging.");
        }
        self.free.sort_by_address();

        self.check_invariants();
        Ok(())
    }

    /// Slides every allocation towards the start of the region, leaving at most
    /// one free block at its end.
    ///
    /// Allocations keep their relative order. The returned [`Compaction`] lists the old and new
    /// address of each of them; client-held addresses are not patched by the heap.
    #[instrument(level = "info", ret(level = Level::DEBUG))]
    pub fn compact(&mut self) -> Compaction {
        self.allocated.sort_by_address();

        let count = self.allocated.len();
        let mut compaction = Compaction::with_capacity(count);

        // Blocks are visited in ascending address order and the cursor never passes the
        // block being visited, so a copy never clobbers data that hasn't been moved yet.
        let mut cursor = 0;
        for block in self.allocated.iter_mut() {
            let from = block.address();
            debug_assert!(cursor <= from);

            if cursor != from {
                self.region.copy_within(from, cursor, block.length());
                block.relocate(cursor);
                debug!(from, to = cursor, length = block.length(), "Moved block.");
            }

            compaction.record(from, cursor);
            cursor += block.length();
        }

        self.free.clear();
        let capacity = self.capacity();
        if cursor < capacity {
            self.free.push_back(Block::new(cursor, capacity - cursor));
        }

        self.check_invariants();
        compaction
    }

    /// Like [`compact`](Heap::compact) but writes the translations into caller-provided buffers
    /// and returns their number.
    ///
    /// # Errors
    /// Returns [`HeapError::OutputCapacityExceeded`] if either buffer is shorter than the number
    /// of live allocations. The check happens before anything is moved.
    #[instrument(level = "info", skip(before, after), err(Display, level = Level::ERROR))]
    pub fn compact_into(&mut self, before: &mut [usize], after: &mut [usize]) -> HeapResult<usize> {
        let required = self.allocated.len();
        let provided = before.len().min(after.len());
        if provided < required {
            return Err(HeapError::OutputCapacityExceeded { required, provided });
        }

        self.compact().write_into(before, after)
    }

    /// Returns the total number of free bytes, contiguous or not.
    pub fn available_memory(&self) -> usize {
        self.free.total_length()
    }

    /// Returns a snapshot of the heap's occupancy.
    pub fn statistics(&self) -> Statistics {
        Statistics::gather(self.capacity(), &self.free, &self.allocated)
    }

    /// Returns the payload of the allocation starting at `address`.
    ///
    /// # Errors
    /// Returns [`HeapError::UnknownBlock`] if `address` doesn't start a live allocation.
    pub fn payload(&self, address: usize) -> HeapResult<&[u8]> {
        let block = self
            .allocated
            .find(address)
            .ok_or(HeapError::UnknownBlock { address })?;
        self.region
            .get(block.address(), block.length())
            .ok_or(HeapError::UnknownBlock { address })
    }

    /// Mutable counterpart of [`payload`](Heap::payload).
    pub fn payload_mut(&mut self, address: usize) -> HeapResult<&mut [u8]> {
        let length = self
            .allocated
            .find(address)
            .map(Block::length)
            .ok_or(HeapError::UnknownBlock { address })?;
        self.region
            .get_mut(address, length)
            .ok_or(HeapError::UnknownBlock { address })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The free set, in ascending address order.
    #[inline]
    pub fn free_blocks(&self) -> &BlockList {
        &self.free
    }

    /// The allocated set, most recent allocation first until the next compaction.
    #[inline]
    pub fn allocated_blocks(&self) -> &BlockList {
        &self.allocated
    }

    /// Releases the region and all block descriptors.
    ///
    /// Dropping the heap has the same effect, this just makes the teardown visible in logs.
    #[instrument(level = "info")]
    pub fn destroy(mut self) {
        self.free.clear();
        self.allocated.clear();
        debug!("Heap destroyed.");
    }

    /// Verifies that the blocks tile the region and that no two free blocks are contiguous.
    /// Compiles to nothing without debug assertions.
    fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }

        let mut blocks: Vec<&Block> = self.free.iter().chain(self.allocated.iter()).collect();
        blocks.sort_unstable_by_key(|b| b.address());

        let mut cursor = 0;
        for block in &blocks {
            debug_assert_eq!(
                block.address(),
                cursor,
                "Blocks should tile the region without gaps or overlaps."
            );
            cursor = block.end();
        }
        debug_assert_eq!(cursor, self.capacity(), "Blocks should cover the whole region.");

        let mut free: Vec<&Block> = self.free.iter().collect();
        free.sort_unstable_by_key(|b| b.address());
        for pair in free.windows(2) {
            debug_assert_ne!(
                pair[0].end(),
                pair[1].address(),
                "Contiguous free blocks should have been merged."
            );
        }
    }
}

#[cfg(test)]
mod tests;
