//! The [`Region`] backing a heap.
//!
//! A region is a fixed-size, zero-initialised byte buffer addressed by offsets.
//! It never grows and is released when dropped.

use core::fmt::{self, Debug};
use core::ops::Range;

use crate::util::bounded_range;

pub struct Region {
    bytes: Box<[u8]>,
}

impl Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl Region {
    /// Allocates a zeroed region of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Region {
            bytes: vec![0_u8; capacity].into_boxed_slice(),
        }
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the bytes in `[address, address + length)` or `None` if the range leaves the region.
    pub fn get(&self, address: usize, length: usize) -> Option<&[u8]> {
        let range = self.range(address, length)?;
        Some(&self.bytes[range])
    }

    /// Mutable counterpart of [`get`](Region::get).
    pub fn get_mut(&mut self, address: usize, length: usize) -> Option<&mut [u8]> {
        let range = self.range(address, length)?;
        Some(&mut self.bytes[range])
    }

    /// Copies `length` bytes from `from` to `to`. The ranges may overlap.
    ///
    /// # Panics
    /// Panics if either range leaves the region.
    pub fn copy_within(&mut self, from: usize, to: usize, length: usize) {
        debug_assert!(self.range(to, length).is_some(), "Destination should be inside the region.");
        let Some(source) = self.range(from, length) else {
            panic!("Source range {from}+{length} is outside of the region.");
        };
        self.bytes.copy_within(source, to);
    }

    #[inline]
    fn range(&self, address: usize, length: usize) -> Option<Range<usize>> {
        bounded_range(address, length, self.capacity())
    }
}
