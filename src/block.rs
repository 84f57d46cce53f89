//! Defines the [`Block`] descriptor.

use core::ops::Range;

use static_assertions::assert_not_impl_any;

use crate::util::checked_end;

/// Describes a contiguous range of the region: `length` bytes starting at offset `address`.
///
/// # Ownership
/// A block is always a member of exactly one [`BlockList`](crate::BlockList).
/// Descriptors can't be cloned, so moving a block between the free and the allocated
/// set means removing it from one list by value and pushing it onto the other.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Block {
    address: usize,
    length: usize,
}

assert_not_impl_any!(Block: Clone, Copy);

impl Block {
    /// Creates a descriptor for `[address, address + length)`.
    ///
    /// Blocks always span at least one byte and never wrap around the address space.
    #[inline]
    pub fn new(address: usize, length: usize) -> Block {
        debug_assert!(length > 0, "Blocks should span at least one byte.");
        debug_assert!(
            checked_end(address, length).is_some(),
            "Block end shouldn't overflow."
        );
        Block { address, length }
    }

    /// Returns the offset of the first byte of the block.
    #[inline(always)]
    pub fn address(&self) -> usize {
        self.address
    }

    /// Returns the number of bytes covered by the block.
    #[inline(always)]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns the offset one past the last byte of the block.
    #[inline(always)]
    pub fn end(&self) -> usize {
        self.address + self.length
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.address..self.end()
    }

    /// Returns whether `other` starts exactly where `self` ends or ends exactly where `self` starts.
    #[inline]
    pub fn is_adjacent_to(&self, other: &Block) -> bool {
        self.end() == other.address || other.end() == self.address
    }

    /// Merges two adjacent blocks into one covering both ranges.
    pub(crate) fn merge(self, other: Block) -> Block {
        debug_assert!(self.is_adjacent_to(&other), "Only adjacent blocks can merge.");
        Block::new(
            self.address.min(other.address),
            self.length + other.length,
        )
    }

    /// Carves `size` bytes off the low end of the block, returning the carved part.
    /// The block keeps the remainder, which might be empty.
    pub(crate) fn carve_front(&mut self, size: usize) -> Block {
        debug_assert!(size > 0 && size <= self.length);
        let carved = Block::new(self.address, size);
        self.address += size;
        self.length -= size;
        carved
    }

    /// Moves the block to `address`, keeping its length.
    #[inline]
    pub(crate) fn relocate(&mut self, address: usize) {
        debug_assert!(address <= self.address, "Blocks only ever move downwards.");
        self.address = address;
    }
}
