use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec,
    vec::Vec,
};
use proptest::prelude::*;
use crate::{ForkTree, LeafError, NodeIndex, StorageConfig, Tracked, Unit};

/// Walks the whole tree and panics if any structural invariant does not hold.
pub(crate) fn validate_tree<P: Unit>(tree: &ForkTree<P>) {
    let storage = tree.storage();
    assert!(!storage.contains(0), "the sentinel slot must never be occupied");
    let root = tree
        .node(NodeIndex::ROOT)
        .expect("the root must always be live");
    assert_eq!(root.parent(), None, "the root must not have a parent");

    let mut reached = BTreeSet::new();
    let mut stack = vec![NodeIndex::ROOT];
    while let Some(index) = stack.pop() {
        assert!(reached.insert(index), "node {} is reachable twice", index);
        let node = tree
            .node(index)
            .unwrap_or_else(|| panic!("node {} is linked but vacant", index));
        match node.unit() {
            Some(unit) => {
                assert!(!node.has_children(), "leaf {} must not have children", index);
                assert_eq!(
                    unit.tree_index(),
                    Some(index),
                    "unit at {} must point back at its leaf",
                    index,
                );
            }
            // Exhausted
            None if index.is_root() => {}
            None => assert!(node.has_children(), "node {} has neither a unit nor children", index),
        }
        if let (Some(left), Some(right)) = (node.left(), node.right()) {
            assert_ne!(left, right, "node {} links the same child twice", index);
        }
        for child in node.left().into_iter().chain(node.right()) {
            let child_node = tree
                .node(child)
                .unwrap_or_else(|| panic!("node {} links to vacant node {}", index, child));
            assert_eq!(
                child_node.parent(),
                Some(index),
                "child {} must point back at its parent",
                child,
            );
            stack.push(child);
        }
    }

    assert_eq!(reached.len(), tree.len(), "every live node must be reachable from the root");
    for index in tree.indices() {
        assert!(reached.contains(&index), "live node {} is unreachable", index);
    }
    assert_eq!(
        storage.free_slots(),
        tree.capacity() - tree.len() - 1,
        "the count of free slots must match the occupancy",
    );
}

#[derive(Clone, Debug)]
enum Op {
    Fork(usize),
    ForkWith(usize),
    Retire(usize),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => any::<usize>().prop_map(Op::Fork),
        1 => any::<usize>().prop_map(Op::ForkWith),
        3 => any::<usize>().prop_map(Op::Retire),
    ];
    proptest::collection::vec(op, 0..200)
}

fn leaves_of(tree: &ForkTree<Tracked<u32>>) -> BTreeMap<NodeIndex, u32> {
    tree.root()
        .leaves()
        .filter_map(|index| tree.unit(index).map(|unit| (index, **unit)))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_live_leaves_match_model(
        ops in ops_strategy(),
        initial_capacity in 2_usize..16,
        growth_increment in 1_usize..8,
    ) {
        let config = StorageConfig::new()
            .with_initial_capacity(initial_capacity)
            .with_growth_increment(growth_increment);
        let mut tree = ForkTree::with_config(config, Tracked::new(0_u32));
        let mut model = BTreeMap::new();
        model.insert(NodeIndex::ROOT, 0_u32);
        let mut next_value = 1_u32;

        for op in ops {
            let leaves: Vec<NodeIndex> = model.keys().copied().collect();
            if leaves.is_empty() {
                prop_assert!(tree.is_exhausted());
                let error = tree
                    .try_fork(NodeIndex::ROOT, Tracked::new(0), Tracked::new(0))
                    .err()
                    .map(|e| e.cause);
                prop_assert_eq!(error, Some(LeafError::WasExhausted));
                continue;
            }
            let live_before: BTreeSet<NodeIndex> = tree.indices().collect();
            match op {
                Op::Fork(selector) => {
                    let leaf = leaves[selector % leaves.len()];
                    let (left_value, right_value) = (next_value, next_value + 1);
                    next_value += 2;
                    let forked = tree.fork(leaf, Tracked::new(left_value), Tracked::new(right_value));
                    prop_assert_eq!(Some(*forked.unit), model.remove(&leaf));
                    prop_assert!(!live_before.contains(&forked.left));
                    prop_assert!(!live_before.contains(&forked.right));
                    model.insert(forked.left, left_value);
                    model.insert(forked.right, right_value);
                }
                Op::ForkWith(selector) => {
                    let leaf = leaves[selector % leaves.len()];
                    let sibling_value = next_value;
                    next_value += 1;
                    let (left, right) = tree.fork_with(leaf, |unit| (unit, Tracked::new(sibling_value)));
                    let old_value = model.remove(&leaf);
                    prop_assert!(old_value.is_some());
                    prop_assert!(!live_before.contains(&left));
                    prop_assert!(!live_before.contains(&right));
                    model.insert(left, old_value.unwrap_or_default());
                    model.insert(right, sibling_value);
                }
                Op::Retire(selector) => {
                    let leaf = leaves[selector % leaves.len()];
                    let retired = tree.retire(leaf);
                    prop_assert_eq!(Some(*retired), model.remove(&leaf));
                    prop_assert_eq!(retired.tree_index(), Some(leaf));
                    prop_assert_eq!(tree.contains(leaf), leaf.is_root());
                }
            }

            validate_tree(&tree);
            prop_assert_eq!(leaves_of(&tree), model.clone());
            prop_assert_eq!(tree.is_exhausted(), model.is_empty());
        }

        for &leaf in model.keys() {
            prop_assert_eq!(tree.ancestors(leaf).last(), Some(NodeIndex::ROOT));
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }
    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_retire_order_of_a_full_tree() {
    // Builds the same depth-2 tree each time and retires its four leaves in every possible order.
    let build = || {
        let mut tree = ForkTree::with_config(
            StorageConfig::new().with_initial_capacity(4).with_growth_increment(2),
            Tracked::new(0_u32),
        );
        let top = tree.fork(NodeIndex::ROOT, Tracked::new(1), Tracked::new(2));
        let left = tree.fork(top.left, Tracked::new(3), Tracked::new(4));
        let right = tree.fork(top.right, Tracked::new(5), Tracked::new(6));
        (tree, [left.left, left.right, right.left, right.right])
    };
    let (_, leaves) = build();
    let positions: Vec<usize> = (0..leaves.len()).collect();
    for_each_permutation(&positions, |order| {
        let (mut tree, leaves) = build();
        assert_eq!(tree.len(), 7);
        for (step, &position) in order.iter().enumerate() {
            assert!(!tree.is_exhausted());
            tree.retire(leaves[position]);
            validate_tree(&tree);
            assert_eq!(tree.root().leaves().count(), leaves.len() - step - 1);
        }
        assert!(tree.is_exhausted());
        assert_eq!(tree.len(), 1);
    });
}
