//! Utility functions.

use core::ops::Range;

/// Returns the end offset of a range starting at `address` and spanning `length` bytes
/// or `None` if that end is not representable.
#[inline(always)]
pub(crate) fn checked_end(address: usize, length: usize) -> Option<usize> {
    address.checked_add(length)
}

/// Returns the `[address, address + length)` range if it lies entirely within `[0, limit)`.
#[inline]
pub(crate) fn bounded_range(address: usize, length: usize, limit: usize) -> Option<Range<usize>> {
    match checked_end(address, length) {
        Some(end) if end <= limit => Some(address..end),
        _ => None,
    }
}
