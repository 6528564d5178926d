//! Host platform primitives: the abstract `host_allocate`/`host_free` the
//! spec's external-interfaces section names, implemented directly against
//! `std::alloc::System` rather than behind a trait — this crate targets a
//! hosted process, so the standard library already *is* the host platform
//! (see `SPEC_FULL.md` §1).

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;
use std::alloc::System;

/// Requests `size` zero-initialized bytes aligned to `align` directly from
/// the system allocator, bypassing the freelist/dynamic-allocator stack
/// entirely. Returns `None` if the host itself refuses (OOM) or the layout
/// is invalid.
///
/// Used for the two cases the spec calls out as going straight to the host:
/// the tracked global allocator's one-time slab acquisition at `startup`,
/// and its documented pre-`startup`/post-`shutdown` safety net.
#[must_use]
pub(crate) fn raw_allocate(size: usize, align: usize) -> Option<NonNull<u8>> {
    let layout = Layout::from_size_align(size, align).ok()?;
    if layout.size() == 0 {
        return None;
    }
    // SAFETY: `layout` has non-zero size and a validated alignment.
    let ptr = unsafe { System.alloc_zeroed(layout) };
    NonNull::new(ptr)
}

/// Releases memory obtained from [`raw_allocate`] with the same `size` and
/// `align` used to acquire it. Calling this on a pointer *not* obtained from
/// [`raw_allocate`] (or with a mismatched layout) is undefined behavior —
/// the caller is responsible for that invariant, exactly as the spec's
/// "host_free" contract assumes.
pub(crate) fn raw_free(ptr: NonNull<u8>, size: usize, align: usize) {
    let Ok(layout) = Layout::from_size_align(size, align) else { return };
    if layout.size() == 0 {
        return;
    }
    // SAFETY: caller guarantees `ptr` was obtained from `raw_allocate` with
    // this exact `(size, align)`.
    unsafe { System.dealloc(ptr.as_ptr(), layout) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let ptr = raw_allocate(128, 8).unwrap();
        // SAFETY: 128 bytes at `ptr` were just reserved.
        unsafe {
            assert!(core::slice::from_raw_parts(ptr.as_ptr(), 128).iter().all(|&b| b == 0));
        }
        raw_free(ptr, 128, 8);
    }

    #[test]
    fn zero_size_rejected() {
        assert!(raw_allocate(0, 8).is_none());
    }
}
