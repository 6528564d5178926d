//! Linear (bump) allocator: a peripheral allocator with no per-allocation
//! metadata and no `free` for individual blocks — only reset-everything.
//!
//! Intended for scratch arenas with well-known lifetimes (a frame, a parse
//! pass) where the cost of tracking each allocation individually isn't
//! worth paying.

use crate::allocator::dynamic::alloc_zeroed_boxed;
use crate::error::{MemoryError, MemoryResult};

/// Bump allocator over an owned buffer.
///
/// Unlike [`crate::allocator::DynamicAllocator`], individual blocks cannot
/// be released — only [`Self::free_all`] reclaims space, by resetting the
/// watermark to zero. No header is written; the caller is fully
/// responsible for remembering sizes if it needs them.
#[derive(Debug)]
pub struct LinearAllocator {
    memory: Box<[u8]>,
    allocated: u64,
}

impl LinearAllocator {
    /// Creates a linear allocator over a freshly allocated buffer of
    /// `capacity` bytes. Fails with [`MemoryError::HostAllocationFailed`]
    /// rather than aborting if the host cannot satisfy the request.
    pub fn new(capacity: u64) -> MemoryResult<Self> {
        if capacity == 0 {
            return Err(MemoryError::ZeroCapacity);
        }
        Ok(Self { memory: alloc_zeroed_boxed(capacity)?, allocated: 0 })
    }

    /// Total capacity of the backing buffer.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.memory.len() as u64
    }

    /// Bytes currently handed out since the last [`Self::free_all`].
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.allocated
    }

    /// Bytes remaining before the watermark reaches capacity.
    #[must_use]
    pub fn query_free(&self) -> u64 {
        self.capacity() - self.allocated
    }

    /// Advances the watermark by `size` bytes and returns a slice into the
    /// newly claimed region, zero-initialized on first use of that region
    /// since construction (subsequent reuse after `free_all` is *not*
    /// re-zeroed; callers needing that should zero on allocate).
    pub fn allocate(&mut self, size: u64) -> MemoryResult<&mut [u8]> {
        if size == 0 {
            return Err(MemoryError::ZeroSize);
        }
        let start = self.allocated;
        let end = start
            .checked_add(size)
            .filter(|&e| e <= self.capacity())
            .ok_or(MemoryError::OutOfSpace { requested: size, capacity: self.capacity() })?;

        self.allocated = end;
        Ok(&mut self.memory[start as usize..end as usize])
    }

    /// Resets the watermark to zero, reclaiming the entire buffer at once.
    /// Does not zero previously used bytes.
    pub fn free_all(&mut self) {
        self.allocated = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_sequentially_and_tracks_watermark() {
        let mut la = LinearAllocator::new(64).unwrap();
        assert_eq!(la.query_free(), 64);

        la.allocate(10).unwrap();
        assert_eq!(la.allocated(), 10);
        assert_eq!(la.query_free(), 54);

        la.allocate(54).unwrap();
        assert_eq!(la.query_free(), 0);
    }

    #[test]
    fn overflow_is_rejected() {
        let mut la = LinearAllocator::new(16).unwrap();
        la.allocate(16).unwrap();
        assert!(matches!(la.allocate(1), Err(MemoryError::OutOfSpace { .. })));
    }

    #[test]
    fn free_all_resets_watermark() {
        let mut la = LinearAllocator::new(32).unwrap();
        la.allocate(32).unwrap();
        assert_eq!(la.query_free(), 0);

        la.free_all();
        assert_eq!(la.query_free(), 32);
        la.allocate(32).unwrap();
    }

    #[test]
    fn zero_size_rejected() {
        let mut la = LinearAllocator::new(16).unwrap();
        assert!(matches!(la.allocate(0), Err(MemoryError::ZeroSize)));
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(LinearAllocator::new(0), Err(MemoryError::ZeroCapacity)));
    }
}
