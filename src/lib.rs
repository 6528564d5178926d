//! memcore — a process-wide tracked general-purpose allocator over a single
//! host-obtained slab.
//!
//! Layered as:
//!
//! - [`freelist`] — arena-indexed free-interval chain, no raw pointers.
//! - [`allocator::dynamic`] — pointer-in/pointer-out allocation over a
//!   freelist, with per-block headers for alignment and size recovery.
//! - [`allocator::linear`] — peripheral bump allocator, reset-all-at-once.
//! - [`global`] — tracked, tagged, singleton wrapper over the dynamic
//!   allocator; the only piece most callers touch directly.
//!
//! The free-function facade in this module mirrors the spec's
//! language-neutral call signatures (`memory_allocate`, `memory_free`, ...)
//! for callers migrating from a C-shaped API; the struct-based
//! [`global::GlobalAllocator`] API is preferred for new Rust code, since it
//! returns `Result` instead of raw pointers and null.

#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless,
    clippy::must_use_candidate
)]

pub mod allocator;
pub mod error;
pub mod freelist;
pub mod global;
mod host;
pub mod stats;
pub mod tag;

pub use allocator::{BlockHeader, DynamicAllocator, LinearAllocator};
pub use error::{MemoryError, MemoryResult};
pub use freelist::Freelist;
pub use global::GlobalAllocator;
pub use tag::MemoryTag;

use std::ptr::NonNull;

/// Starts the process-wide allocator with a slab of `capacity_bytes`.
/// Returns `false` if already started (mirroring the C-shaped API's
/// boolean-success convention); use [`GlobalAllocator::startup`] directly if
/// you want the underlying error.
#[must_use]
pub fn memory_startup(capacity_bytes: u64) -> bool {
    GlobalAllocator::global().startup(capacity_bytes).is_ok()
}

/// Shuts the process-wide allocator down. No-op (and silently ignored) if
/// it was never started or already shut down.
pub fn memory_shutdown() {
    let _ = GlobalAllocator::global().shutdown();
}

/// Allocates `size` zero-initialized bytes tagged `tag`. Returns a null
/// pointer on failure.
#[must_use]
pub fn memory_allocate(size: u64, tag: MemoryTag) -> *mut u8 {
    GlobalAllocator::global()
        .allocate(size, tag)
        .map_or(core::ptr::null_mut(), NonNull::as_ptr)
}

/// Allocates `size` zero-initialized bytes aligned to `alignment`, tagged
/// `tag`. Returns a null pointer on failure.
#[must_use]
pub fn memory_allocate_aligned(size: u64, alignment: u16, tag: MemoryTag) -> *mut u8 {
    GlobalAllocator::global()
        .allocate_aligned(size, alignment, tag)
        .map_or(core::ptr::null_mut(), NonNull::as_ptr)
}

/// Releases a block obtained from [`memory_allocate`]. `size` and `tag` must
/// match the original allocation; mismatches and foreign pointers are
/// logged and ignored rather than acted on (see `DESIGN.md` for the
/// rationale against falling back to a raw host free).
pub fn memory_free(ptr: *mut u8, size: u64, tag: MemoryTag) {
    let Some(ptr) = NonNull::new(ptr) else { return };
    if let Err(err) = GlobalAllocator::global().free(ptr, size, tag) {
        #[cfg(feature = "logging")]
        tracing::error!(%err, "memory_free() rejected");
        #[cfg(not(feature = "logging"))]
        let _ = err;
    }
}

/// Releases a block obtained from [`memory_allocate_aligned`].
pub fn memory_free_aligned(ptr: *mut u8, size: u64, alignment: u16, tag: MemoryTag) {
    let Some(ptr) = NonNull::new(ptr) else { return };
    if let Err(err) = GlobalAllocator::global().free_aligned(ptr, size, alignment, tag) {
        #[cfg(feature = "logging")]
        tracing::error!(%err, "memory_free_aligned() rejected");
        #[cfg(not(feature = "logging"))]
        let _ = err;
    }
}

/// Zeroes `n` bytes starting at `ptr`. No-op on a null pointer.
pub fn memory_clear(ptr: *mut u8, n: u64) {
    if ptr.is_null() || n == 0 {
        return;
    }
    // SAFETY: caller guarantees `ptr` is valid for `n` bytes, per the
    // contract of this C-shaped facade.
    unsafe {
        core::ptr::write_bytes(ptr, 0, n as usize);
    }
}

/// Fills `n` bytes starting at `ptr` with `value`. No-op on a null pointer.
pub fn memory_set(ptr: *mut u8, value: u8, n: u64) {
    if ptr.is_null() || n == 0 {
        return;
    }
    // SAFETY: caller guarantees `ptr` is valid for `n` bytes.
    unsafe {
        core::ptr::write_bytes(ptr, value, n as usize);
    }
}

/// Copies `n` bytes from `src` to `dst`. The regions must not overlap;
/// use [`memory_move`] if they might.
pub fn memory_copy(dst: *mut u8, src: *const u8, n: u64) {
    if dst.is_null() || src.is_null() || n == 0 {
        return;
    }
    // SAFETY: caller guarantees non-overlapping, valid regions of `n` bytes.
    unsafe {
        core::ptr::copy_nonoverlapping(src, dst, n as usize);
    }
}

/// Copies `n` bytes from `src` to `dst`, correctly handling overlap.
pub fn memory_move(dst: *mut u8, src: *const u8, n: u64) {
    if dst.is_null() || src.is_null() || n == 0 {
        return;
    }
    // SAFETY: caller guarantees valid regions of `n` bytes; overlap is
    // permitted since `copy` (unlike `copy_nonoverlapping`) handles it.
    unsafe {
        core::ptr::copy(src, dst, n as usize);
    }
}

/// Byte-compares `n` bytes at `a` and `b`.
#[must_use]
pub fn memory_equal(a: *const u8, b: *const u8, n: u64) -> bool {
    if n == 0 {
        return true;
    }
    if a.is_null() || b.is_null() {
        return a == b;
    }
    // SAFETY: caller guarantees valid regions of `n` bytes at `a` and `b`.
    unsafe {
        let lhs = core::slice::from_raw_parts(a, n as usize);
        let rhs = core::slice::from_raw_parts(b, n as usize);
        lhs == rhs
    }
}

/// Human-readable per-tag accounting report. Empty string if the allocator
/// is not currently running.
#[must_use]
pub fn memory_stat() -> String {
    GlobalAllocator::global().stat().unwrap_or_default()
}

/// Total successful allocations since startup. `0` if not running.
#[must_use]
pub fn memory_allocation_count() -> u64 {
    GlobalAllocator::global().allocation_count().unwrap_or(0)
}

/// Total successful frees since startup. `0` if not running.
#[must_use]
pub fn memory_free_count() -> u64 {
    GlobalAllocator::global().free_count().unwrap_or(0)
}
