//! Error types for memcore.
//!
//! One `thiserror`-derived enum covers every failure mode described by the
//! five error kinds the allocator distinguishes: programmer error,
//! exhaustion, platform failure, invariant violation, and (as a marker
//! rather than a returned error) statistical warnings, which are logged but
//! do not fail the call.

use thiserror::Error;

/// Errors produced by the freelist, dynamic allocator, and tracked global
/// allocator.
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    // --- Programmer error ---
    #[error("allocation size must be non-zero")]
    ZeroSize,

    #[error("pointer is null")]
    NullPointer,

    #[error("alignment {alignment} is not a power of two")]
    InvalidAlignment { alignment: u32 },

    #[error("alignment {alignment} exceeds the maximum supported alignment (128)")]
    AlignmentTooWide { alignment: u32 },

    #[error("offset {offset} is outside the managed range [0, {capacity})")]
    OffsetOutOfRange { offset: u64, capacity: u64 },

    #[error("free() was called with a size/offset pair that does not match a live allocation")]
    UnknownBlock,

    #[error("pointer was not allocated by this allocator")]
    ForeignPointer,

    #[error("double free detected for an already-released block")]
    DoubleFree,

    // --- Exhaustion ---
    #[error("no free interval of at least {requested} bytes remains (capacity {capacity})")]
    OutOfSpace { requested: u64, capacity: u64 },

    #[error("freelist node pool exhausted ({max_entries} slots in use)")]
    NodePoolExhausted { max_entries: usize },

    // --- Platform failure ---
    #[error("host allocation of {size} bytes failed")]
    HostAllocationFailed { size: u64 },

    // --- Invariant violation ---
    #[error("mutex acquisition failed: {context}")]
    LockFailed { context: &'static str },

    #[error("freelist chain corruption detected: {detail}")]
    Corruption { detail: String },

    #[error("invalid operation: {context}")]
    InvalidOperation { context: &'static str },

    // --- State machine ---
    #[error("memory_startup() called twice")]
    AlreadyInitialized,

    #[error("allocator is not in the READY state")]
    NotReady,

    // --- General ---
    #[error("capacity must be non-zero")]
    ZeroCapacity,
}

impl MemoryError {
    /// True for errors that represent a caller bug (bad arguments, misuse).
    #[must_use]
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::ZeroSize
                | Self::NullPointer
                | Self::InvalidAlignment { .. }
                | Self::AlignmentTooWide { .. }
                | Self::OffsetOutOfRange { .. }
                | Self::UnknownBlock
                | Self::ForeignPointer
                | Self::DoubleFree
                | Self::ZeroCapacity
        )
    }

    /// True when the failure is "no space left", not a bug or a platform fault.
    #[must_use]
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::OutOfSpace { .. } | Self::NodePoolExhausted { .. })
    }

    /// True when the host itself refused to hand over memory.
    #[must_use]
    pub fn is_platform_failure(&self) -> bool {
        matches!(self, Self::HostAllocationFailed { .. })
    }

    /// True when an internal invariant (lock, chain structure) was violated.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::LockFailed { .. } | Self::Corruption { .. })
    }

    /// True for an operation that is structurally invalid (e.g. freeing a
    /// pointer this allocator never handed out) but is not itself a
    /// corrupted-state condition.
    #[must_use]
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation { .. } | Self::ForeignPointer | Self::UnknownBlock)
    }

    /// Stable short code for categorization, analogous to an errno-style tag.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroSize => "MEM:ALLOC:ZERO_SIZE",
            Self::NullPointer => "MEM:ALLOC:NULL_PTR",
            Self::InvalidAlignment { .. } => "MEM:ALLOC:BAD_ALIGN",
            Self::AlignmentTooWide { .. } => "MEM:ALLOC:ALIGN_TOO_WIDE",
            Self::OffsetOutOfRange { .. } => "MEM:FREELIST:BAD_OFFSET",
            Self::UnknownBlock => "MEM:FREELIST:UNKNOWN_BLOCK",
            Self::ForeignPointer => "MEM:ALLOC:FOREIGN_PTR",
            Self::DoubleFree => "MEM:ALLOC:DOUBLE_FREE",
            Self::OutOfSpace { .. } => "MEM:FREELIST:OOM",
            Self::NodePoolExhausted { .. } => "MEM:FREELIST:POOL_EXHAUSTED",
            Self::HostAllocationFailed { .. } => "MEM:PLATFORM:ALLOC_FAILED",
            Self::LockFailed { .. } => "MEM:GLOBAL:LOCK_FAILED",
            Self::Corruption { .. } => "MEM:FREELIST:CORRUPTION",
            Self::InvalidOperation { .. } => "MEM:GLOBAL:INVALID_OP",
            Self::AlreadyInitialized => "MEM:GLOBAL:ALREADY_INIT",
            Self::NotReady => "MEM:GLOBAL:NOT_READY",
            Self::ZeroCapacity => "MEM:CONFIG:ZERO_CAPACITY",
        }
    }
}

/// Convenience alias used throughout the crate.
pub type MemoryResult<T> = Result<T, MemoryError>;
