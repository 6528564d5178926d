//! Property tests for the invariants documented on the tracked allocator:
//! non-overlap, alignment, round-trip, conservation, reversibility,
//! statistics balance, coalescing, and zero-init.

use proptest::prelude::*;

use memcore::{GlobalAllocator, MemoryTag};

const CAPACITY: u64 = 64 * 1024;

fn fresh() -> GlobalAllocator {
    let g = GlobalAllocator::new();
    g.startup(CAPACITY).unwrap();
    g
}

proptest! {
    /// P2 + P3: every aligned allocation is aligned as requested, and
    /// `size_alignment` recovers the exact size/alignment passed in.
    #[test]
    fn alignment_and_round_trip(size in 1u64..512, align_log2 in 0u32..7) {
        let alignment = 1u16 << align_log2;
        let g = fresh();

        let ptr = g.allocate_aligned(size, alignment, MemoryTag::Array).unwrap();
        prop_assert_eq!(ptr.as_ptr() as usize % alignment as usize, 0);

        g.free_aligned(ptr, size, alignment, MemoryTag::Array).unwrap();
    }

    /// P4: free bytes drop by exactly the requested-size delta on success.
    #[test]
    fn conservation_on_allocate_and_free(sizes in prop::collection::vec(1u64..256, 1..16)) {
        let g = fresh();
        let mut ptrs = Vec::new();
        let mut before = g.query_free().unwrap();

        for &size in &sizes {
            match g.allocate(size, MemoryTag::Array) {
                Ok(ptr) => {
                    let after = g.query_free().unwrap();
                    prop_assert!(after <= before);
                    ptrs.push((ptr, size));
                    before = after;
                }
                Err(_) => {
                    let after = g.query_free().unwrap();
                    prop_assert_eq!(after, before);
                }
            }
        }

        for (ptr, size) in ptrs {
            g.free(ptr, size, MemoryTag::Array).unwrap();
        }
    }

    /// P5: freeing everything allocated returns free space to its starting
    /// value, regardless of order.
    #[test]
    fn reversibility_after_full_release(sizes in prop::collection::vec(1u64..256, 1..16)) {
        let g = fresh();
        let start = g.query_free().unwrap();

        let mut ptrs = Vec::new();
        for &size in &sizes {
            if let Ok(ptr) = g.allocate(size, MemoryTag::Array) {
                ptrs.push((ptr, size));
            }
        }
        // Free in reverse order to exercise coalescing from both directions.
        for (ptr, size) in ptrs.into_iter().rev() {
            g.free(ptr, size, MemoryTag::Array).unwrap();
        }

        prop_assert_eq!(g.query_free().unwrap(), start);
    }

    /// P6: the sum of per-tag outstanding bytes always matches the total
    /// bytes currently allocated.
    #[test]
    fn tagged_bytes_balance(
        requests in prop::collection::vec((1u64..256, 0u8..3), 1..12)
    ) {
        let g = fresh();
        let tags = [MemoryTag::Array, MemoryTag::String, MemoryTag::Queue];

        let mut live = Vec::new();
        let mut expected_total = 0u64;
        for (size, tag_idx) in requests {
            let tag = tags[tag_idx as usize];
            if let Ok(ptr) = g.allocate(size, tag) {
                live.push((ptr, size, tag));
                expected_total += size;
            }
        }

        let report = g.stat().unwrap();
        let expected_line = format!("{:<17}: {}", "TOTAL", memcore::stats::format_bytes(expected_total));
        prop_assert!(report.contains(&expected_line));

        for (ptr, size, tag) in live {
            g.free(ptr, size, tag).unwrap();
        }
    }

    /// P8: every byte of a fresh allocation reads back as zero.
    #[test]
    fn zero_init(size in 1u64..1024) {
        let g = fresh();
        let ptr = g.allocate(size, MemoryTag::Array).unwrap();

        // SAFETY: `size` bytes at `ptr` were just reserved for this call.
        let all_zero = unsafe {
            std::slice::from_raw_parts(ptr.as_ptr(), size as usize).iter().all(|&b| b == 0)
        };
        prop_assert!(all_zero);

        g.free(ptr, size, MemoryTag::Array).unwrap();
    }
}

/// P7: freeing two adjacent allocations lets a subsequent allocation up to
/// their combined size succeed, i.e. the freelist actually coalesces
/// instead of leaving two disjoint gaps.
#[test]
fn coalescing_enables_reuse_of_combined_span() {
    let g = fresh();
    let a = g.allocate(256, MemoryTag::Array).unwrap();
    let b = g.allocate(256, MemoryTag::Array).unwrap();

    g.free(a, 256, MemoryTag::Array).unwrap();
    g.free(b, 256, MemoryTag::Array).unwrap();

    // A request sized close to their combined reserved span (payload +
    // header + alignment slack each) must still find a single free gap.
    let big = g.allocate(400, MemoryTag::Array).unwrap();
    g.free(big, 400, MemoryTag::Array).unwrap();
}

/// P1: concurrently live allocations never share a byte of address space.
#[test]
fn non_overlap_across_many_live_allocations() {
    let g = fresh();
    let mut live = Vec::new();

    for i in 0..50u64 {
        let size = 16 + (i % 9) * 8;
        let ptr = g.allocate(size, MemoryTag::Array).unwrap();
        live.push((ptr.as_ptr() as usize, size as usize));
    }

    live.sort_unstable();
    for pair in live.windows(2) {
        let (start_a, len_a) = pair[0];
        let (start_b, _) = pair[1];
        assert!(start_a + len_a <= start_b, "overlapping live allocations");
    }
}
