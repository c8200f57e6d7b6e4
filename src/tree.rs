//! Main tree structure: sparse bitmap allocator over a huge index space.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::mem;

use crate::node::{InternalNode, LeafNode, Node};
use crate::word::TreeWord;

/// Sparse hierarchical bitmap allocator.
///
/// Tracks which indices of a very large domain are in use and answers three
/// questions: allocate the lowest free index, reserve a specific index, and
/// release an index. A leaf alone covers B² indices (B = word bit width);
/// each extra level multiplies capacity by B, and capacity grows on demand
/// by wrapping a new root around the old one.
///
/// # Architecture
/// - B-way branching at every level (B = 32 or 64, fixed by the word type)
/// - Lazy materialization: a subtree exists only once an index inside it
///   has been touched, so memory tracks touched regions, not domain size
/// - Per-node free-summary words answer "any free slot below?" in O(1),
///   letting first-fit search skip full subtrees with one TZCNT per level
///
/// # Complexity
/// All operations run in O(log_B capacity) with no I/O and no blocking.
/// The structure is single-owner; callers needing concurrent access must
/// wrap every operation, reads included, in external synchronization.
///
/// # Example
/// ```rust
/// use bitmap_tree_alloc::BitmapTree;
///
/// let mut tree = BitmapTree::<u64>::new();
/// assert_eq!(tree.current_capacity(), 4096);
///
/// tree.allocate_at(10_000_000_000);
/// assert!(tree.is_allocated(10_000_000_000));
/// assert_eq!(tree.allocated_slots(), 1);
/// ```
#[derive(Debug)]
pub struct BitmapTree<W: TreeWord> {
    /// Root node, exclusively owned. A lone leaf until the first growth.
    pub(crate) root: Box<Node<W>>,

    /// Number of internal nodes on the root-to-leaf path.
    pub(crate) levels: u32,

    /// Addressable index range, always B^(levels + 2).
    ///
    /// Kept as u128 so growth arithmetic never overflows even when the
    /// capacity chain passes 2^64.
    pub(crate) capacity: u128,

    /// Count of live allocations.
    pub(crate) allocated: u64,
}

#[inline(always)]
fn branches<W: TreeWord>() -> u128 {
    W::BRANCHES as u128
}

impl<W: TreeWord> BitmapTree<W> {
    /// Create an empty tree covering B² indices with a single leaf root.
    pub fn new() -> Self {
        BitmapTree {
            root: Box::new(Node::Leaf(LeafNode::new())),
            levels: 0,
            capacity: branches::<W>() * branches::<W>(),
            allocated: 0,
        }
    }

    /// Count of live allocations.
    #[inline(always)]
    pub fn allocated_slots(&self) -> u64 {
        self.allocated
    }

    /// Current addressable index range, a power of B. Never decreases.
    #[inline(always)]
    pub fn current_capacity(&self) -> u128 {
        self.capacity
    }

    /// True if no index is currently allocated.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Reserve a specific index, growing capacity as needed.
    ///
    /// Re-reserving an already-allocated index is a no-op: the count and
    /// the tree are left untouched.
    ///
    /// # Performance
    /// O(log_B idx) - one descent plus the upward summary propagation.
    pub fn allocate_at(&mut self, idx: u64) {
        self.grow_to_cover(idx);
        let capacity = self.capacity;
        let levels = self.levels;
        let (newly_allocated, _) = Self::allocate_in(&mut self.root, idx as u128, capacity, levels);
        if newly_allocated {
            self.allocated += 1;
        }
    }

    /// Find and reserve the lowest free index.
    ///
    /// One `lowest_set_bit` lookup per level picks the first branch that
    /// still has a free slot; if the whole tree is full, a new root level
    /// is wrapped on and the search retried (branches 1..B-1 of the new
    /// root are virgin, so the retry always succeeds).
    ///
    /// # Returns
    /// The absolute index reserved, in the same domain as `allocate_at`.
    ///
    /// # Performance
    /// O(log_B capacity) - first-fit never inspects a full subtree.
    pub fn allocate(&mut self) -> u64 {
        loop {
            let capacity = self.capacity;
            let levels = self.levels;
            if let Some((idx, _)) = Self::allocate_first(&mut self.root, capacity, levels) {
                self.allocated += 1;
                return idx as u64;
            }
            self.push_root_level();
        }
    }

    /// Release a previously allocated index.
    ///
    /// A no-op when `idx` is beyond capacity, lies under a branch that was
    /// never materialized, or is already free. The count is decremented
    /// only when the index was actually allocated.
    ///
    /// # Performance
    /// O(log_B capacity) - no materialization is ever performed.
    pub fn deallocate(&mut self, idx: u64) {
        if idx as u128 >= self.capacity {
            return;
        }
        let capacity = self.capacity;
        if Self::release_in(&mut self.root, idx as u128, capacity) == Some(true) {
            self.allocated -= 1;
        }
    }

    /// True if `idx` is currently allocated.
    ///
    /// Read-only descent: returns false beyond capacity or at the first
    /// unmaterialized branch (never touched means never allocated).
    pub fn is_allocated(&self, idx: u64) -> bool {
        let mut idx = idx as u128;
        if idx >= self.capacity {
            return false;
        }
        let mut node = &*self.root;
        let mut cover = self.capacity;
        loop {
            cover /= branches::<W>();
            let bucket = (idx / cover) as u32;
            idx %= cover;
            match node {
                Node::Leaf(leaf) => return leaf.is_allocated(bucket, idx as u32),
                Node::Internal(internal) => match internal.child(bucket) {
                    Some(child) => node = child,
                    None => return false,
                },
            }
        }
    }

    /// Wrap root levels until `idx` fits inside the capacity.
    fn grow_to_cover(&mut self, idx: u64) {
        while idx as u128 >= self.capacity {
            self.push_root_level();
        }
    }

    /// Wrap a new internal root around the current root.
    ///
    /// The old root becomes branch 0 of the new root; branches 1..B-1 stay
    /// unmaterialized and therefore free. Branch 0's free-summary bit
    /// mirrors whether the old root still had a free slot.
    fn push_root_level(&mut self) {
        let mut new_root = InternalNode::new();
        if !self.root.has_free_slot() {
            new_root.clear_free(0);
        }
        let mut old_root = Box::new(Node::Internal(new_root));
        mem::swap(&mut self.root, &mut old_root);
        if let Node::Internal(internal) = &mut *self.root {
            internal.adopt(0, old_root);
        }
        self.capacity *= branches::<W>();
        self.levels += 1;
    }

    /// Descend to `idx` and mark it allocated, materializing the path.
    ///
    /// `cover` is the index range this node spans, `level` the number of
    /// internal nodes at or below it (0 = leaf). Returns (newly allocated,
    /// subtree now has no free slot); the second flag drives the upward
    /// clearing of ancestor free-summary bits.
    fn allocate_in(node: &mut Node<W>, idx: u128, cover: u128, level: u32) -> (bool, bool) {
        let child_cover = cover / branches::<W>();
        let bucket = (idx / child_cover) as u32;
        let rest = idx % child_cover;
        match node {
            Node::Leaf(leaf) => {
                let newly_allocated = leaf.allocate(bucket, rest as u32);
                (newly_allocated, !leaf.has_free_slot())
            }
            Node::Internal(internal) => {
                if !internal.free_summary.test_bit(bucket) {
                    // Branch already fully allocated: the whole call is a
                    // redundant no-op, no need to descend to the leaf.
                    return (false, !internal.has_free_slot());
                }
                let child = internal.materialize(bucket, level == 1);
                let (newly_allocated, child_full) =
                    Self::allocate_in(child, rest, child_cover, level - 1);
                if child_full {
                    internal.clear_free(bucket);
                }
                (newly_allocated, !internal.has_free_slot())
            }
        }
    }

    /// First-fit descent: take the lowest free index under this node.
    ///
    /// Returns `None` only when the node's free-summary word is zero, i.e.
    /// the subtree is fully allocated. On success returns the index local
    /// to this subtree and the now-full flag, as in `allocate_in`.
    fn allocate_first(node: &mut Node<W>, cover: u128, level: u32) -> Option<(u128, bool)> {
        let child_cover = cover / branches::<W>();
        match node {
            Node::Leaf(leaf) => {
                let (word, bit) = leaf.lowest_free()?;
                leaf.allocate(word, bit);
                let idx = word as u128 * child_cover + bit as u128;
                Some((idx, !leaf.has_free_slot()))
            }
            Node::Internal(internal) => {
                let bucket = internal.lowest_free_branch()?;
                let child = internal.materialize(bucket, level == 1);
                let (sub_idx, child_full) = Self::allocate_first(child, child_cover, level - 1)?;
                if child_full {
                    internal.clear_free(bucket);
                }
                let idx = bucket as u128 * child_cover + sub_idx;
                Some((idx, !internal.has_free_slot()))
            }
        }
    }

    /// Descend to `idx` and mark it free, without materializing anything.
    ///
    /// Returns `None` when the path hits an unmaterialized branch (the
    /// index was never allocated), otherwise whether the leaf bit actually
    /// changed. Every ancestor on a completed path gets its free-summary
    /// bit set; the set is unconditional because the leaf now provably has
    /// a free slot.
    fn release_in(node: &mut Node<W>, idx: u128, cover: u128) -> Option<bool> {
        let child_cover = cover / branches::<W>();
        let bucket = (idx / child_cover) as u32;
        let rest = idx % child_cover;
        match node {
            Node::Leaf(leaf) => Some(leaf.release(bucket, rest as u32)),
            Node::Internal(internal) => {
                let child = internal.child_mut(bucket)?;
                let newly_freed = Self::release_in(child, rest, child_cover)?;
                internal.set_free(bucket);
                Some(newly_freed)
            }
        }
    }
}

impl<W: TreeWord> Default for BitmapTree<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: TreeWord> Drop for BitmapTree<W> {
    /// Teardown with an explicit traversal stack.
    ///
    /// Growth puts no bound on tree depth, so children are detached onto a
    /// stack before each node is dropped and the compiler-generated drop
    /// never recurses deeper than one level.
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node<W>>> = Vec::new();
        if let Node::Internal(internal) = &mut *self.root {
            for slot in internal.children.iter_mut() {
                if let Some(child) = slot.take() {
                    stack.push(child);
                }
            }
        }
        while let Some(mut node) = stack.pop() {
            if let Node::Internal(internal) = &mut *node {
                for slot in internal.children.iter_mut() {
                    if let Some(child) = slot.take() {
                        stack.push(child);
                    }
                }
            }
        }
    }
}
