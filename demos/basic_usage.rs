//! Basic usage example for bitmap-tree-alloc.
//!
//! This example demonstrates the four allocator operations and on-demand
//! capacity growth.

use bitmap_tree_alloc::BitmapTree;

fn main() {
    println!("=== Bitmap Tree Allocator - Basic Usage Example ===\n");

    // Create a new allocator over u64 words (64-way branching)
    let mut tree = BitmapTree::<u64>::new();
    println!("Created empty tree");
    println!("Initial capacity: {} indices", tree.current_capacity());

    // First-fit allocation hands out the lowest free indices
    println!("\nFirst-fit allocation:");
    for _ in 0..4 {
        println!("  allocate() -> {}", tree.allocate());
    }

    // Reserve specific indices
    println!("\nReserving specific indices: 100, 101, 4095");
    tree.allocate_at(100);
    tree.allocate_at(101);
    tree.allocate_at(4095);
    println!("Live allocations: {}", tree.allocated_slots());

    // Membership checks
    println!("\nMembership checks:");
    println!("  is_allocated(100): {}", tree.is_allocated(100));
    println!("  is_allocated(102): {}", tree.is_allocated(102));

    // Releasing an index makes it the next first-fit candidate
    println!("\nReleasing index 1:");
    tree.deallocate(1);
    println!("  is_allocated(1): {}", tree.is_allocated(1));
    println!("  allocate() -> {} (lowest free slot reused)", tree.allocate());

    // Reserving far beyond the current capacity grows the tree, while
    // memory stays proportional to the touched regions
    println!("\nSparse reservation at index 10_000_000_000:");
    tree.allocate_at(10_000_000_000);
    println!("  capacity is now {} indices", tree.current_capacity());
    println!("  is_allocated(10_000_000_000): {}", tree.is_allocated(10_000_000_000));
    println!("  live allocations: {}", tree.allocated_slots());

    // Redundant operations are defined no-ops
    println!("\nDefensive calls:");
    tree.allocate_at(100); // already allocated
    tree.deallocate(999_999); // never allocated
    println!("  live allocations unchanged: {}", tree.allocated_slots());
}
