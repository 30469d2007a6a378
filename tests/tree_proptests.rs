//! Property based tests for `AvlTree`.
//!
//! Differential testing against `BTreeSet` as an oracle, plus the shape
//! guarantees that follow from the balance invariant.

use proptest::prelude::*;
use rwavl::tree::AvlTree;
use std::collections::BTreeSet;

/// Operations for random testing.
#[derive(Debug, Clone)]
enum Op {
    Insert(u16),
    Delete(u16),
    DeleteHead,
    DeleteTail,
    Reverse,
}

fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            4 => any::<u16>().prop_map(Op::Insert),
            2 => any::<u16>().prop_map(Op::Delete),
            1 => Just(Op::DeleteHead),
            1 => Just(Op::DeleteTail),
            1 => Just(Op::Reverse),
        ],
        0..=max_ops,
    )
}

// the tallest avl tree with n nodes is about 1.44 log2(n + 2) high
fn max_depth(n: usize) -> usize {
    (1.4405 * ((n + 2) as f64).log2()) as usize
}

fn in_order(t: &AvlTree<u16>) -> Vec<u16> {
    let mut r = Vec::new();
    t.walk_in_order(|_, _, v| {
        r.push(*v);
        true
    });
    r
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// An in order walk of any insert sequence is sorted and
    /// deduplicated.
    #[test]
    fn walk_is_sorted(values in prop::collection::vec(any::<u16>(), 0..500)) {
        let t: AvlTree<u16> = values.iter().cloned().collect();
        let model: BTreeSet<u16> = values.iter().cloned().collect();
        prop_assert_eq!(t.len(), model.len());
        prop_assert_eq!(in_order(&t), model.into_iter().collect::<Vec<_>>());
    }

    /// The depth never exceeds the avl height bound.
    #[test]
    fn depth_is_logarithmic(values in prop::collection::vec(any::<u16>(), 1..1000)) {
        let t: AvlTree<u16> = values.into_iter().collect();
        let depth = t.depth().unwrap();
        prop_assert!(depth <= max_depth(t.len()), "depth {} len {}", depth, t.len());
    }

    /// Index and rank agree with the sorted sequence.
    #[test]
    fn index_matches_sorted(values in prop::collection::vec(any::<u16>(), 0..300)) {
        let t: AvlTree<u16> = values.iter().cloned().collect();
        let sorted: Vec<u16> = values.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        for (i, v) in sorted.iter().enumerate() {
            prop_assert_eq!(t.index(i), Some(*v));
            prop_assert_eq!(t.rank(v), Some(i));
        }
        prop_assert_eq!(t.index(sorted.len()), None);
    }

    /// Deleting every inserted value leaves an empty tree, and every
    /// delete succeeds exactly once.
    #[test]
    fn delete_all_empties(values in prop::collection::hash_set(any::<u16>(), 0..300)) {
        let t: AvlTree<u16> = values.iter().cloned().collect();
        for v in &values {
            prop_assert!(t.delete(v));
            prop_assert!(!t.delete(v));
        }
        prop_assert!(t.is_empty());
        prop_assert_eq!(t.len(), 0);
        prop_assert_eq!(t.depth(), None);
    }

    /// Random operation sequences behave like a BTreeSet viewed in
    /// the tree's current orientation.
    #[test]
    fn ops_match_btreeset(ops in operations(400)) {
        let t = AvlTree::new();
        let mut model = BTreeSet::new();
        let mut reversed = false;
        for op in ops {
            match op {
                Op::Insert(k) => {
                    prop_assert_eq!(t.insert(k).is_none(), model.insert(k));
                }
                Op::Delete(k) => {
                    prop_assert_eq!(t.delete(&k), model.remove(&k));
                }
                Op::DeleteHead => {
                    let min = model.iter().next().cloned();
                    if let Some(m) = min {
                        model.remove(&m);
                    }
                    prop_assert_eq!(t.delete_at_head(), min);
                }
                Op::DeleteTail => {
                    let max = model.iter().next_back().cloned();
                    if let Some(m) = max {
                        model.remove(&m);
                    }
                    prop_assert_eq!(t.delete_at_tail(), max);
                }
                Op::Reverse => {
                    t.reverse();
                    reversed = !reversed;
                }
            }
            prop_assert_eq!(t.len(), model.len());
        }
        prop_assert_eq!(t.is_reversed(), reversed);
        let mut expected: Vec<u16> = model.iter().cloned().collect();
        if reversed {
            expected.reverse();
        }
        prop_assert_eq!(t.snapshot(), expected);
        prop_assert_eq!(t.find_min(), model.iter().next().cloned());
        prop_assert_eq!(t.find_max(), model.iter().next_back().cloned());
        if !t.is_empty() {
            prop_assert!(t.depth().unwrap() <= max_depth(t.len()));
        }
    }

    /// Inserting a value twice leaves the length unchanged.
    #[test]
    fn duplicate_insert_is_idempotent(values in prop::collection::vec(any::<u16>(), 1..200)) {
        let t: AvlTree<u16> = values.iter().cloned().collect();
        let len = t.len();
        for v in &values {
            prop_assert_eq!(t.insert(*v), Some(*v));
        }
        prop_assert_eq!(t.len(), len);
        prop_assert_eq!(t.search(&values[0]), Some(values[0]));
    }
}
