//! Memory tag — a fixed enumeration used only for accounting.
//!
//! Tags attach a category to an allocation for `stat()` reporting; they have
//! no effect on allocation behavior. `ALL` is an accumulator slot, not a
//! category a caller should pass to `allocate`.

use core::fmt;

/// Category attached to an allocation for accounting purposes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MemoryTag {
    Unknown = 0,
    Array,
    String,
    Hashtable,
    Queue,
    LinearAllocator,
    DynamicAllocator,
    Thread,
    Mutex,
    Semaphore,
    Freelist,
    Application,
    /// Accumulator over every other tag — not a real category.
    All,
}

/// Number of real categories, `All` excluded.
pub const TAG_COUNT: usize = 12;

/// Every tag except the `All` accumulator, in declaration order.
pub const ALL_TAGS: [MemoryTag; TAG_COUNT] = [
    MemoryTag::Unknown,
    MemoryTag::Array,
    MemoryTag::String,
    MemoryTag::Hashtable,
    MemoryTag::Queue,
    MemoryTag::LinearAllocator,
    MemoryTag::DynamicAllocator,
    MemoryTag::Thread,
    MemoryTag::Mutex,
    MemoryTag::Semaphore,
    MemoryTag::Freelist,
    MemoryTag::Application,
];

impl MemoryTag {
    /// Index into a fixed-size per-tag stats array. `All` has no slot of its
    /// own — it is the sum across `ALL_TAGS`, computed on demand.
    #[must_use]
    pub(crate) fn index(self) -> Option<usize> {
        if matches!(self, Self::All) {
            None
        } else {
            Some(self as usize)
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Array => "ARRAY",
            Self::String => "STRING",
            Self::Hashtable => "HASHTABLE",
            Self::Queue => "QUEUE",
            Self::LinearAllocator => "LINEAR_ALLOCATOR",
            Self::DynamicAllocator => "DYNAMIC_ALLOCATOR",
            Self::Thread => "THREAD",
            Self::Mutex => "MUTEX",
            Self::Semaphore => "SEMAPHORE",
            Self::Freelist => "FREELIST",
            Self::Application => "APPLICATION",
            Self::All => "ALL",
        }
    }
}

impl fmt::Display for MemoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_excludes_all() {
        assert_eq!(MemoryTag::All.index(), None);
        assert_eq!(MemoryTag::Unknown.index(), Some(0));
        assert_eq!(MemoryTag::Application.index(), Some(TAG_COUNT - 1));
    }

    #[test]
    fn all_tags_len_matches_count() {
        assert_eq!(ALL_TAGS.len(), TAG_COUNT);
    }
}
