//! Defines the [`BlockList`] struct, the collection backing both the free and the allocated set.

use core::cmp::Reverse;
use std::collections::vec_deque::{self, VecDeque};

use tracing::{debug, instrument};

use crate::block::Block;
use crate::strategy::Strategy;

/// An ordered collection of [`Block`]s.
///
/// The list makes no ordering promises of its own: blocks stay where they were pushed
/// until [`sort_by_address`](BlockList::sort_by_address) is called.
/// Fit searches and coalescing scan in the current order, so callers that want
/// deterministic address-ordered behaviour sort after every mutation.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BlockList {
    blocks: VecDeque<Block>,
}

impl BlockList {
    /// Creates an empty list.
    #[inline]
    pub fn new() -> Self {
        BlockList {
            blocks: VecDeque::new(),
        }
    }

    /// Creates a list holding a single block.
    pub fn with_block(block: Block) -> Self {
        let mut list = BlockList::new();
        list.push_back(block);
        list
    }

    /// Adds `block` to the front of the list.
    /// This operation has a time complexity of *O*(1).
    #[inline]
    pub fn push_front(&mut self, block: Block) {
        debug_assert!(self.find(block.address()).is_none(), "Addresses should be unique.");
        self.blocks.push_front(block);
    }

    /// Adds `block` to the back of the list.
    /// This operation has an amortised time complexity of *O*(1).
    #[inline]
    pub fn push_back(&mut self, block: Block) {
        debug_assert!(self.find(block.address()).is_none(), "Addresses should be unique.");
        self.blocks.push_back(block);
    }

    /// Returns the block starting at `address` or `None` if there is no such block.
    pub fn find(&self, address: usize) -> Option<&Block> {
        self.blocks.iter().find(|b| b.address() == address)
    }

    /// Returns the first block (in list order) holding at least `min_length` bytes.
    pub fn first_fit(&self, min_length: usize) -> Option<&Block> {
        self.blocks.iter().find(|b| b.length() >= min_length)
    }

    /// Returns the block holding at least `min_length` bytes with the smallest leftover.
    /// Among equally good blocks the one appearing first in the list wins.
    pub fn best_fit(&self, min_length: usize) -> Option<&Block> {
        self.candidates(min_length)
            .min_by_key(|b| b.length() - min_length)
    }

    /// Returns the block holding at least `min_length` bytes with the largest leftover.
    /// Among equally good blocks the one appearing first in the list wins.
    pub fn worst_fit(&self, min_length: usize) -> Option<&Block> {
        // `max_by_key` keeps the last maximum, `min_by_key` over the reversed key keeps the first.
        self.candidates(min_length)
            .min_by_key(|b| Reverse(b.length() - min_length))
    }

    /// Runs the search selected by `strategy`.
    pub fn find_fit(&self, strategy: Strategy, min_length: usize) -> Option<&Block> {
        match strategy {
            Strategy::FirstFit => self.first_fit(min_length),
            Strategy::BestFit => self.best_fit(min_length),
            Strategy::WorstFit => self.worst_fit(min_length),
        }
    }

    /// Removes the block starting at `address` from the list and hands it back.
    /// Returns `None` if no such block is a member.
    pub fn remove(&mut self, address: usize) -> Option<Block> {
        let index = self.position(address)?;
        self.blocks.remove(index)
    }

    /// Carves `size` bytes off the low end of the member starting at `address`.
    /// The member keeps the remainder in place or leaves the list if nothing remains.
    ///
    /// Returns the carved block or `None` if there is no such member or it is shorter than `size`.
    pub fn take_front(&mut self, address: usize, size: usize) -> Option<Block> {
        debug_assert!(size > 0);
        let index = self.position(address)?;
        let block = &mut self.blocks[index];
        if block.length() < size {
            return None;
        }

        let carved = block.carve_front(size);
        if block.length() == 0 {
            debug!(address, "Block fully consumed, removing it.");
            self.blocks.remove(index);
        }
        Some(carved)
    }

    /// Removes all blocks.
    #[inline]
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Reorders the list by ascending block address.
    pub fn sort_by_address(&mut self) {
        // Addresses are unique so stability doesn't matter.
        self.blocks
            .make_contiguous()
            .sort_unstable_by_key(Block::address);
    }

    /// Merges the member starting at `pivot` with every block that is contiguous with it.
    ///
    /// Each merge removes both blocks and appends a single block spanning them; the merged
    /// block then serves as the pivot for the next scan, so whole chains of contiguous blocks
    /// collapse in one call. Returns the final merged block or `None` if `pivot` is not a member.
    #[instrument(level = "debug", skip(self))]
    pub fn coalesce(&mut self, pivot: usize) -> Option<&Block> {
        let mut pivot_index = self.position(pivot)?;

        loop {
            let pivot_block = &self.blocks[pivot_index];
            let Some(neighbour_index) = self
                .blocks
                .iter()
                .position(|b| b.is_adjacent_to(pivot_block))
            else {
                debug!(block = ?pivot_block, "No contiguous block left, stopping merge.");
                break;
            };

            // Remove the higher index first so the lower one stays valid.
            let higher = self.blocks.remove(pivot_index.max(neighbour_index));
            let lower = self.blocks.remove(pivot_index.min(neighbour_index));
            let (Some(higher), Some(lower)) = (higher, lower) else {
                unreachable!("Both indices were found within the list.");
            };

            let merged = lower.merge(higher);
            debug!(?merged, "Merged contiguous blocks.");
            self.blocks.push_back(merged);
            pivot_index = self.blocks.len() - 1;
        }

        self.blocks.get(pivot_index)
    }

    /// Returns the number of blocks in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns the sum of the lengths of all blocks.
    pub fn total_length(&self) -> usize {
        self.blocks.iter().map(Block::length).sum()
    }

    /// Iterates over the blocks in list order.
    #[inline]
    pub fn iter(&self) -> vec_deque::Iter<'_, Block> {
        self.blocks.iter()
    }

    #[inline]
    pub(crate) fn iter_mut(&mut self) -> vec_deque::IterMut<'_, Block> {
        self.blocks.iter_mut()
    }

    #[inline]
    fn position(&self, address: usize) -> Option<usize> {
        self.blocks.iter().position(|b| b.address() == address)
    }

    /// Blocks holding at least `min_length` bytes, in list order.
    #[inline]
    fn candidates(&self, min_length: usize) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter().filter(move |b| b.length() >= min_length)
    }
}

impl<'a> IntoIterator for &'a BlockList {
    type Item = &'a Block;
    type IntoIter = vec_deque::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Block> for BlockList {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        let mut list = BlockList::new();
        for block in iter {
            list.push_back(block);
        }
        list
    }
}
