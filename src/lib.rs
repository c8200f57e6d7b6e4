//! # bitmap-tree-alloc
//!
//! Sparse hierarchical bitmap allocator for huge index spaces.
//!
//! Tracks which integers in a very large, sparsely-used index domain are
//! in use, and hands out stable small-integer handles: allocate the lowest
//! free index, reserve a specific index, release an index. The domain can
//! reach 2^36 and beyond while memory stays proportional to the number of
//! touched regions, because subtrees are materialized lazily.
//!
//! ## Features
//! - O(log_B capacity) allocate / allocate_at / deallocate / is_allocated
//! - First-fit allocation via count-trailing-zeros on per-node summaries
//! - Capacity grows on demand by wrapping a new root, never shrinks
//! - Generic over the word type (u32 or u64); branching factor = bit width
//! - no_std compatible (requires alloc)
//!
//! ## Example
//! ```rust
//! use bitmap_tree_alloc::BitmapTree;
//!
//! let mut tree = BitmapTree::<u64>::new();
//! assert_eq!(tree.allocate(), 0);
//! assert_eq!(tree.allocate(), 1);
//!
//! tree.allocate_at(10_000_000_000);
//! assert!(tree.is_allocated(10_000_000_000));
//!
//! tree.deallocate(0);
//! assert_eq!(tree.allocate(), 0); // lowest free slot is reused
//! ```

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod node;
mod tree;
mod word;

#[cfg(test)]
mod proptests;

pub use tree::BitmapTree;
pub use word::TreeWord;
