//! Allocator layer: the pointer-in/pointer-out dynamic allocator built on
//! [`crate::freelist::Freelist`], and the peripheral linear (bump) allocator.

pub mod dynamic;
pub mod linear;

pub use dynamic::{BlockHeader, DynamicAllocator};
pub use linear::LinearAllocator;
