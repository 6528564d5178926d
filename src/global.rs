//! Tracked global allocator: a process-wide singleton wrapping a single
//! [`DynamicAllocator`] with per-tag byte accounting.
//!
//! One [`parking_lot::Mutex`] guards the entire state — allocator, tag
//! table, live-block table, and counters — so every operation is
//! serialized and there is exactly one lock to reason about. Lifecycle
//! follows `UNINIT -> READY -> SHUTDOWN`; `SHUTDOWN` is terminal; there is
//! no path back to `READY`.
//!
//! `allocate`/`allocate_aligned`/`free`/`free_aligned` work outside
//! `READY` too, via an untracked fallback straight to the host allocator
//! ([`crate::host`]) — a documented safety net for code paths that must
//! allocate before `startup` or after `shutdown` (logger bootstrap being
//! the canonical example). Every other operation (`query_free`, `stat`,
//! the counters) requires `READY` and returns [`MemoryError::NotReady`]
//! otherwise, since there is no tracked state to report on outside it.

use std::collections::HashMap;
use std::ptr::NonNull;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::allocator::DynamicAllocator;
use crate::error::{MemoryError, MemoryResult};
use crate::host;
use crate::stats::format_bytes;
use crate::tag::{MemoryTag, ALL_TAGS, TAG_COUNT};

/// Alignment the pre-`startup`/post-`shutdown` safety net uses when the
/// caller didn't ask for a specific one (mirrors `DynamicAllocator`'s own
/// default).
const SAFETY_NET_DEFAULT_ALIGNMENT: usize = core::mem::align_of::<usize>();

struct LiveBlock {
    tag: MemoryTag,
    requested_size: u64,
}

struct Ready {
    allocator: DynamicAllocator,
    /// Total bytes requested of `startup`, for [`GlobalAllocator::stat`]'s
    /// reserved-capacity line.
    capacity: u64,
    tagged_bytes: [u64; TAG_COUNT],
    allocation_count: u64,
    free_count: u64,
    live: HashMap<usize, LiveBlock>,
}

enum State {
    Uninit,
    Ready(Ready),
    Shutdown,
}

/// Process-wide tracked allocator. Use [`GlobalAllocator::global`] to reach
/// the singleton, or construct one directly for an isolated instance (tests
/// commonly want the latter to avoid cross-test interference).
pub struct GlobalAllocator {
    state: Mutex<State>,
}

impl GlobalAllocator {
    /// Creates a fresh, un-started instance. Most callers want
    /// [`Self::global`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self { state: Mutex::new(State::Uninit) }
    }

    /// The process-wide singleton.
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<GlobalAllocator> = OnceLock::new();
        INSTANCE.get_or_init(GlobalAllocator::new)
    }

    /// Transitions `UNINIT -> READY`, backing the allocator with a slab of
    /// `capacity_bytes`. Fails if already started (in any state).
    pub fn startup(&self, capacity_bytes: u64) -> MemoryResult<()> {
        let mut guard = self.state.lock();
        match &*guard {
            State::Uninit => {
                let allocator = DynamicAllocator::new(capacity_bytes)?;
                *guard = State::Ready(Ready {
                    allocator,
                    capacity: capacity_bytes,
                    tagged_bytes: [0; TAG_COUNT],
                    allocation_count: 0,
                    free_count: 0,
                    live: HashMap::new(),
                });
                #[cfg(feature = "logging")]
                tracing::info!(capacity_bytes, "memory subsystem started");
                Ok(())
            }
            State::Ready(_) => Err(MemoryError::AlreadyInitialized),
            State::Shutdown => Err(MemoryError::AlreadyInitialized),
        }
    }

    /// Transitions `READY -> SHUTDOWN`. Terminal: a shut-down allocator
    /// cannot be restarted. A no-op (`Ok(())`) when called before `startup`,
    /// so teardown code can call it unconditionally.
    pub fn shutdown(&self) -> MemoryResult<()> {
        let mut guard = self.state.lock();
        match &*guard {
            State::Uninit => Ok(()),
            State::Ready(ready) => {
                #[cfg(feature = "logging")]
                {
                    if ready.allocation_count != ready.free_count {
                        tracing::warn!(
                            live_blocks = ready.live.len(),
                            allocation_count = ready.allocation_count,
                            free_count = ready.free_count,
                            "memory subsystem shutting down with outstanding allocations"
                        );
                    } else {
                        tracing::info!(
                            live_blocks = ready.live.len(),
                            allocation_count = ready.allocation_count,
                            free_count = ready.free_count,
                            "memory subsystem shutting down"
                        );
                    }
                }
                #[cfg(not(feature = "logging"))]
                let _ = ready;
                *guard = State::Shutdown;
                Ok(())
            }
            State::Shutdown => Err(MemoryError::NotReady),
        }
    }

    fn with_ready<R>(&self, f: impl FnOnce(&mut Ready) -> MemoryResult<R>) -> MemoryResult<R> {
        let mut guard = self.state.lock();
        match &mut *guard {
            State::Ready(ready) => f(ready),
            State::Uninit | State::Shutdown => Err(MemoryError::NotReady),
        }
    }

    /// Allocates `size` bytes tagged `tag`, zero-initialized, at the
    /// allocator's default alignment.
    pub fn allocate(&self, size: u64, tag: MemoryTag) -> MemoryResult<NonNull<u8>> {
        self.allocate_aligned_inner(size, None, tag)
    }

    /// Allocates `size` bytes tagged `tag`, zero-initialized, aligned to
    /// `alignment`.
    pub fn allocate_aligned(
        &self,
        size: u64,
        alignment: u16,
        tag: MemoryTag,
    ) -> MemoryResult<NonNull<u8>> {
        self.allocate_aligned_inner(size, Some(alignment), tag)
    }

    fn allocate_aligned_inner(
        &self,
        size: u64,
        alignment: Option<u16>,
        tag: MemoryTag,
    ) -> MemoryResult<NonNull<u8>> {
        if size == 0 {
            return Err(MemoryError::ZeroSize);
        }

        let mut guard = self.state.lock();
        match &mut *guard {
            State::Ready(ready) => {
                let ptr = match alignment {
                    Some(alignment) => ready.allocator.allocate_aligned(size, alignment)?,
                    None => ready.allocator.allocate(size)?,
                };

                // SAFETY: `size` bytes at `ptr` were just reserved
                // exclusively for this call by the dynamic allocator.
                unsafe {
                    core::ptr::write_bytes(ptr.as_ptr(), 0, size as usize);
                }

                if tag == MemoryTag::Unknown {
                    #[cfg(feature = "logging")]
                    tracing::warn!(size, "allocate() called with MemoryTag::Unknown; accounting anyway");
                }
                if let Some(idx) = tag.index() {
                    ready.tagged_bytes[idx] += size;
                }
                ready.allocation_count += 1;
                ready.live.insert(ptr.as_ptr() as usize, LiveBlock { tag, requested_size: size });

                Ok(ptr)
            }
            State::Uninit | State::Shutdown => {
                // Spec §4.C / §5: calling an allocation API outside READY
                // is a documented safety net for early/late code paths (e.g.
                // logger initialization before `startup`) — it falls through
                // to the raw host allocator, completely untracked. Never
                // rely on this path for correct statistics.
                #[cfg(feature = "logging")]
                tracing::warn!(
                    size,
                    tag = %tag,
                    "allocate() called outside READY state; falling back to an untracked raw host allocation"
                );
                let align = alignment.map_or(SAFETY_NET_DEFAULT_ALIGNMENT, usize::from);
                host::raw_allocate(size as usize, align)
                    .ok_or(MemoryError::HostAllocationFailed { size })
            }
        }
    }

    /// Releases a block obtained from [`Self::allocate`]. `size` and `tag`
    /// must match the values passed at allocation time — this is verified
    /// against the tracked table, catching both foreign pointers and
    /// caller bookkeeping bugs.
    pub fn free(&self, ptr: NonNull<u8>, size: u64, tag: MemoryTag) -> MemoryResult<()> {
        self.free_inner(ptr, size, None, tag)
    }

    /// Alias matching the spec's aligned/unaligned free entry points; the
    /// tracked table does not distinguish them since alignment is not part
    /// of the accounting key — it's only consulted by the outside-READY
    /// safety net below, where there is no tracked key to consult at all.
    pub fn free_aligned(
        &self,
        ptr: NonNull<u8>,
        size: u64,
        alignment: u16,
        tag: MemoryTag,
    ) -> MemoryResult<()> {
        self.free_inner(ptr, size, Some(alignment), tag)
    }

    fn free_inner(
        &self,
        ptr: NonNull<u8>,
        size: u64,
        alignment: Option<u16>,
        tag: MemoryTag,
    ) -> MemoryResult<()> {
        let mut guard = self.state.lock();
        match &mut *guard {
            State::Ready(ready) => {
                let key = ptr.as_ptr() as usize;
                let recorded = ready.live.get(&key).ok_or(MemoryError::UnknownBlock)?;

                if recorded.requested_size != size || recorded.tag != tag {
                    #[cfg(feature = "logging")]
                    tracing::warn!(
                        expected_size = recorded.requested_size,
                        given_size = size,
                        expected_tag = %recorded.tag,
                        given_tag = %tag,
                        "free() called with mismatched size/tag"
                    );
                    return Err(MemoryError::InvalidOperation {
                        context: "free() size/tag does not match the tracked allocation",
                    });
                }

                ready.allocator.free(ptr)?;

                if recorded.tag == MemoryTag::Unknown {
                    #[cfg(feature = "logging")]
                    tracing::warn!(
                        size = recorded.requested_size,
                        "free() called with MemoryTag::Unknown; accounting anyway"
                    );
                }
                if let Some(idx) = recorded.tag.index() {
                    ready.tagged_bytes[idx] -= recorded.requested_size;
                }
                ready.free_count += 1;
                ready.live.remove(&key);
                Ok(())
            }
            State::Uninit | State::Shutdown => {
                // Mirrors the allocate-side safety net: a pointer handed
                // back while not READY is assumed to have come from the raw
                // host fallback in `allocate_aligned_inner`, not from a
                // live dynamic-allocator block. There is no tracked table
                // to validate against outside READY, so this is trusted
                // exactly as far as the spec's "observed behavior, not an
                // endorsed one" framing suggests it should be.
                #[cfg(feature = "logging")]
                tracing::warn!(
                    size,
                    tag = %tag,
                    "free() called outside READY state; releasing via the untracked raw host allocator"
                );
                let align = alignment.map_or(SAFETY_NET_DEFAULT_ALIGNMENT, usize::from);
                host::raw_free(ptr, size as usize, align);
                Ok(())
            }
        }
    }

    /// Number of successful [`Self::allocate`]/[`Self::allocate_aligned`]
    /// calls since startup.
    pub fn allocation_count(&self) -> MemoryResult<u64> {
        self.with_ready(|ready| Ok(ready.allocation_count))
    }

    /// Number of successful [`Self::free`]/[`Self::free_aligned`] calls
    /// since startup.
    pub fn free_count(&self) -> MemoryResult<u64> {
        self.with_ready(|ready| Ok(ready.free_count))
    }

    /// Bytes still available in the underlying slab.
    pub fn query_free(&self) -> MemoryResult<u64> {
        self.with_ready(|ready| Ok(ready.allocator.query_free()))
    }

    /// Formats a human-readable accounting report: bytes outstanding per
    /// tag, auto-scaled to B/KiB/MiB/GiB, a `TOTAL` line, and the reserved
    /// capacity passed to `startup`.
    pub fn stat(&self) -> MemoryResult<String> {
        self.with_ready(|ready| {
            let mut out = String::from("System memory usage:\n");
            let mut total = 0u64;
            for t in ALL_TAGS {
                let idx = t.index().expect("ALL_TAGS never contains the All accumulator");
                let bytes = ready.tagged_bytes[idx];
                total += bytes;
                out.push_str(&format!("          {:<17}: {}\n", t.as_str(), format_bytes(bytes)));
            }
            out.push_str("          ------------------------------\n");
            out.push_str(&format!("          {:<17}: {}\n", "TOTAL", format_bytes(total)));
            out.push_str(&format!("                            ({} reserved)\n", format_bytes(ready.capacity)));
            Ok(out)
        })
    }
}

impl Default for GlobalAllocator {
    fn default() -> Self {
        Self::new()
    }
}
