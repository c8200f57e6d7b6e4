//! Model-based property tests.
//!
//! Random operation sequences are replayed against a naive model (a set of
//! allocated indices); after every step the tree must agree with the model
//! and every free-summary/materialized word must match the subtree below it.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::vec;
use std::vec::Vec;

use crate::node::Node;
use crate::tree::BitmapTree;
use crate::word::TreeWord;

/// Check the free-summary and materialized invariants of a whole subtree.
///
/// Returns whether the subtree still contains a free index, so callers can
/// verify the parent's summary bit against it.
fn check_subtree<W: TreeWord>(node: &Node<W>) -> bool {
    match node {
        Node::Leaf(leaf) => {
            for (i, word) in leaf.words.iter().enumerate() {
                assert_eq!(
                    leaf.free_summary.test_bit(i as u32),
                    !word.is_zero(),
                    "leaf summary bit {i} out of sync with its word"
                );
            }
            !leaf.free_summary.is_zero()
        }
        Node::Internal(internal) => {
            let mut any_free = false;
            for branch in 0..W::BRANCHES {
                let slot = &internal.children[branch as usize];
                assert_eq!(
                    internal.materialized.test_bit(branch),
                    slot.is_some(),
                    "materialized bit {branch} out of sync with child slot"
                );
                let branch_free = match slot {
                    Some(child) => check_subtree(child),
                    // Virgin branch: an untouched range is always free
                    None => true,
                };
                assert_eq!(
                    internal.free_summary.test_bit(branch),
                    branch_free,
                    "free-summary bit {branch} out of sync with subtree"
                );
                any_free |= branch_free;
            }
            any_free
        }
    }
}

fn validate<W: TreeWord>(tree: &BitmapTree<W>) {
    check_subtree(&tree.root);
}

/// Count materialized nodes, root included.
fn count_nodes<W: TreeWord>(tree: &BitmapTree<W>) -> usize {
    let mut count = 0;
    let mut stack: Vec<&Node<W>> = vec![&*tree.root];
    while let Some(node) = stack.pop() {
        count += 1;
        if let Node::Internal(internal) = node {
            for child in internal.children.iter().flatten() {
                stack.push(child);
            }
        }
    }
    count
}

#[derive(Debug, Clone)]
enum Op {
    Allocate,
    AllocateAt(u64),
    Deallocate(u64),
    Query(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Allocate),
        2 => (0u64..100_000).prop_map(Op::AllocateAt),
        2 => (0u64..100_000).prop_map(Op::Deallocate),
        1 => (0u64..100_000).prop_map(Op::Query),
    ]
}

proptest! {
    #[test]
    fn matches_naive_model(ops in proptest::collection::vec(op_strategy(), 1..300)) {
        let mut tree = BitmapTree::<u64>::new();
        let mut model: BTreeSet<u64> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Allocate => {
                    let expected = (0u64..).find(|i| !model.contains(i)).unwrap();
                    let got = tree.allocate();
                    prop_assert_eq!(got, expected, "allocate must return the lowest free index");
                    model.insert(got);
                }
                Op::AllocateAt(idx) => {
                    tree.allocate_at(idx);
                    model.insert(idx);
                    prop_assert!(tree.is_allocated(idx));
                }
                Op::Deallocate(idx) => {
                    tree.deallocate(idx);
                    model.remove(&idx);
                    prop_assert!(!tree.is_allocated(idx));
                }
                Op::Query(idx) => {
                    prop_assert_eq!(tree.is_allocated(idx), model.contains(&idx));
                }
            }
            prop_assert_eq!(tree.allocated_slots(), model.len() as u64);
            validate(&tree);
        }
    }

    #[test]
    fn matches_naive_model_u32_words(ops in proptest::collection::vec(op_strategy(), 1..200)) {
        let mut tree = BitmapTree::<u32>::new();
        let mut model: BTreeSet<u64> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Allocate => {
                    let expected = (0u64..).find(|i| !model.contains(i)).unwrap();
                    prop_assert_eq!(tree.allocate(), expected);
                    model.insert(expected);
                }
                Op::AllocateAt(idx) => {
                    tree.allocate_at(idx);
                    model.insert(idx);
                }
                Op::Deallocate(idx) => {
                    tree.deallocate(idx);
                    model.remove(&idx);
                }
                Op::Query(idx) => {
                    prop_assert_eq!(tree.is_allocated(idx), model.contains(&idx));
                }
            }
            prop_assert_eq!(tree.allocated_slots(), model.len() as u64);
            validate(&tree);
        }
    }

    #[test]
    fn sparse_indices_stay_sparse(indices in proptest::collection::btree_set(0u64..(1 << 40), 1..50)) {
        let mut tree = BitmapTree::<u64>::new();

        for &idx in &indices {
            tree.allocate_at(idx);
        }
        prop_assert_eq!(tree.allocated_slots(), indices.len() as u64);
        for &idx in &indices {
            prop_assert!(tree.is_allocated(idx));
        }

        // Memory tracks touched regions: one root-to-leaf path per distinct
        // index plus the old-root spine left behind by growth, never
        // anything proportional to the domain size.
        let path_len = tree.levels as usize + 1;
        prop_assert!(count_nodes(&tree) <= (indices.len() + 1) * path_len);
        validate(&tree);
    }

    #[test]
    fn deallocate_all_restores_empty(indices in proptest::collection::btree_set(0u64..50_000, 1..100)) {
        let mut tree = BitmapTree::<u64>::new();

        for &idx in &indices {
            tree.allocate_at(idx);
        }
        for &idx in &indices {
            tree.deallocate(idx);
        }

        prop_assert!(tree.is_empty());
        for &idx in &indices {
            prop_assert!(!tree.is_allocated(idx));
        }
        validate(&tree);

        // A drained tree hands out indices from zero again
        prop_assert_eq!(tree.allocate(), 0);
    }
}
