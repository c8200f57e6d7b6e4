//! Leaf and internal node structures for the bitmap tree.

use alloc::boxed::Box;
use alloc::vec;

use crate::word::TreeWord;

/// Leaf node storing B words of B occupancy bits each (B² indices).
///
/// Bit set = index free, bit clear = index allocated. `free_summary` bit i
/// is set iff `words[i]` still has at least one free bit, so "does this
/// leaf have a free slot" is a single zero test.
#[derive(Debug)]
pub(crate) struct LeafNode<W: TreeWord> {
    /// Occupancy bits, one word per bucket of B indices.
    pub(crate) words: Box<[W]>,

    /// Bit i set iff `words[i]` has at least one free bit.
    pub(crate) free_summary: W,
}

/// Internal node whose B branches are lazily materialized child subtrees.
///
/// `materialized` bit i is set iff `children[i]` exists. `free_summary`
/// bit i is set iff branch i's subtree still contains a free index; an
/// unmaterialized branch covers a never-touched range and is always free.
#[derive(Debug)]
pub(crate) struct InternalNode<W: TreeWord> {
    /// Single-owner child slots, `None` until materialized.
    pub(crate) children: Box<[Option<Box<Node<W>>>]>,

    /// Bit i set iff `children[i]` has been created.
    pub(crate) materialized: W,

    /// Bit i set iff branch i's subtree has at least one free index.
    pub(crate) free_summary: W,
}

/// One level of the index space: either a leaf of raw occupancy bits or an
/// internal node of child links.
///
/// A tagged sum dispatched explicitly at each tree operation. Both variants
/// answer "any free branch?" in O(1) via their free-summary word.
#[derive(Debug)]
pub(crate) enum Node<W: TreeWord> {
    Leaf(LeafNode<W>),
    Internal(InternalNode<W>),
}

impl<W: TreeWord> LeafNode<W> {
    /// Create a leaf with every index free.
    pub(crate) fn new() -> Self {
        LeafNode {
            words: vec![W::ONES; W::BRANCHES as usize].into_boxed_slice(),
            free_summary: W::ONES,
        }
    }

    /// True if at least one of the B² indices is free.
    #[inline(always)]
    pub(crate) fn has_free_slot(&self) -> bool {
        !self.free_summary.is_zero()
    }

    /// Lowest free index as a (word, bit) pair, or `None` if the leaf is full.
    #[inline]
    pub(crate) fn lowest_free(&self) -> Option<(u32, u32)> {
        let word = self.free_summary.lowest_set_bit()?;
        let bit = self.words[word as usize].lowest_set_bit()?;
        Some((word, bit))
    }

    /// True if the given index is allocated.
    #[inline(always)]
    pub(crate) fn is_allocated(&self, word: u32, bit: u32) -> bool {
        !self.words[word as usize].test_bit(bit)
    }

    /// Mark one index allocated.
    ///
    /// Clears the free-summary bit when the word runs out of free bits.
    /// Returns `true` if the index was free before the call (newly
    /// allocated), `false` if this was a redundant re-allocation.
    pub(crate) fn allocate(&mut self, word: u32, bit: u32) -> bool {
        let w = &mut self.words[word as usize];
        if !w.test_bit(bit) {
            return false;
        }
        w.clear_bit(bit);
        if w.is_zero() {
            self.free_summary.clear_bit(word);
        }
        true
    }

    /// Mark one index free.
    ///
    /// Unconditionally sets the free-summary bit: freeing can only add a
    /// free slot to the word. Returns `true` if the index was allocated
    /// before the call (newly freed), `false` if it was already free.
    pub(crate) fn release(&mut self, word: u32, bit: u32) -> bool {
        let w = &mut self.words[word as usize];
        let newly_freed = !w.test_bit(bit);
        w.set_bit(bit);
        self.free_summary.set_bit(word);
        newly_freed
    }
}

impl<W: TreeWord> InternalNode<W> {
    /// Create an internal node with zero materialized children.
    ///
    /// Every branch is virgin and therefore trivially free.
    pub(crate) fn new() -> Self {
        InternalNode {
            children: (0..W::BRANCHES).map(|_| None).collect(),
            materialized: W::ZERO,
            free_summary: W::ONES,
        }
    }

    /// True if at least one branch still has a free index.
    #[inline(always)]
    pub(crate) fn has_free_slot(&self) -> bool {
        !self.free_summary.is_zero()
    }

    /// Lowest-numbered branch with a free index, or `None` if all full.
    #[inline(always)]
    pub(crate) fn lowest_free_branch(&self) -> Option<u32> {
        self.free_summary.lowest_set_bit()
    }

    /// Shared reference to the child at `branch`, if materialized.
    #[inline(always)]
    pub(crate) fn child(&self, branch: u32) -> Option<&Node<W>> {
        self.children[branch as usize].as_deref()
    }

    /// Exclusive reference to the child at `branch`, if materialized.
    #[inline(always)]
    pub(crate) fn child_mut(&mut self, branch: u32) -> Option<&mut Node<W>> {
        self.children[branch as usize].as_deref_mut()
    }

    /// Child at `branch`, creating it on first touch.
    ///
    /// A new child is a leaf when `as_leaf` is set, otherwise an internal
    /// node; either way it starts with every index free, so the branch's
    /// free-summary bit (already set for a virgin branch) stays correct.
    pub(crate) fn materialize(&mut self, branch: u32, as_leaf: bool) -> &mut Node<W> {
        self.materialized.set_bit(branch);
        let child = self.children[branch as usize].get_or_insert_with(|| {
            Box::new(if as_leaf {
                Node::Leaf(LeafNode::new())
            } else {
                Node::Internal(InternalNode::new())
            })
        });
        &mut **child
    }

    /// Adopt an existing subtree at `branch` (used when wrapping a new root).
    pub(crate) fn adopt(&mut self, branch: u32, child: Box<Node<W>>) {
        self.children[branch as usize] = Some(child);
        self.materialized.set_bit(branch);
    }

    /// Mark branch `branch` as having a free index.
    #[inline(always)]
    pub(crate) fn set_free(&mut self, branch: u32) {
        self.free_summary.set_bit(branch);
    }

    /// Mark branch `branch` as fully allocated.
    #[inline(always)]
    pub(crate) fn clear_free(&mut self, branch: u32) {
        self.free_summary.clear_bit(branch);
    }
}

impl<W: TreeWord> Node<W> {
    /// True if the subtree rooted here still contains a free index.
    #[inline(always)]
    pub(crate) fn has_free_slot(&self) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.has_free_slot(),
            Node::Internal(internal) => internal.has_free_slot(),
        }
    }
}
