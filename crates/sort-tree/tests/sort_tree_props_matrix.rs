use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use sort_tree::MapSortTree;

#[derive(Clone, Debug)]
enum Op {
    Set(u8, i16),
    Remove(u8),
    Bulk(Vec<(u8, i16)>),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..32, -20i16..20).prop_map(|(k, v)| Op::Set(k, v)),
        2 => (0u8..32).prop_map(Op::Remove),
        1 => prop::collection::vec((0u8..32, -20i16..20), 0..8).prop_map(Op::Bulk),
    ]
}

fn ascending(a: &i16, b: &i16) -> i32 {
    i32::from(*b) - i32::from(*a)
}

type Tree = MapSortTree<u8, i16, fn(&i16, &i16) -> i32>;

fn check(tree: &Tree, present: &BTreeSet<u8>) {
    tree.assert_valid().unwrap();
    assert_eq!(tree.len(), present.len());

    let forward: Vec<u8> = tree.keys().copied().collect();
    let mut reversed: Vec<u8> = tree.keys_reversed().copied().collect();
    reversed.reverse();
    assert_eq!(forward, reversed);
    assert_eq!(forward.iter().copied().collect::<BTreeSet<_>>(), *present);

    let values: Vec<i16> = forward.iter().map(|k| tree.map()[k]).collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));

    assert_eq!(tree.first_key(), forward.first());
    assert_eq!(tree.last_key(), forward.last());
}

proptest! {
    #[test]
    fn random_ops_keep_tree_ordered(ops in prop::collection::vec(op(), 1..80)) {
        let mut tree: Tree = MapSortTree::new(HashMap::new(), ascending);
        let mut present = BTreeSet::new();

        for op in ops {
            match op {
                Op::Set(k, v) => {
                    tree.map_mut().insert(k, v);
                    tree.update(k).unwrap();
                    present.insert(k);
                    prop_assert_eq!(tree.keys_from_key(&k, true).unwrap().next(), Some(&k));
                }
                Op::Remove(k) => {
                    prop_assert_eq!(tree.remove(&k), present.remove(&k));
                    prop_assert!(!tree.remove(&k));
                }
                Op::Bulk(changes) => {
                    for (k, v) in changes {
                        tree.map_mut().insert(k, v);
                        present.insert(k);
                    }
                    for k in &present {
                        if !tree.contains_key(k) {
                            tree.update(*k).unwrap();
                        }
                    }
                    tree.update_all().unwrap();
                }
            }
            check(&tree, &present);
        }
    }

    #[test]
    fn value_bounds_split_the_order(
        values in prop::collection::vec(-50i16..50, 1..40),
        probe in -60i16..60,
    ) {
        let map: HashMap<u8, i16> = values.iter().enumerate().map(|(i, v)| (i as u8, *v)).collect();
        let mut tree: Tree = MapSortTree::new(map, ascending);
        for k in 0..values.len() as u8 {
            tree.update(k).unwrap();
        }

        let value = |k: &u8| tree.map()[k];
        let after_incl: Vec<i16> = tree.keys_from_value(&probe, true).map(value).collect();
        let after_excl: Vec<i16> = tree.keys_from_value(&probe, false).map(value).collect();
        let before_incl: Vec<i16> = tree.keys_reversed_from_value(&probe, true).map(value).collect();
        let before_excl: Vec<i16> = tree.keys_reversed_from_value(&probe, false).map(value).collect();

        let mut sorted = values.clone();
        sorted.sort();
        let mut expect_before_incl: Vec<i16> = sorted.iter().copied().filter(|v| *v <= probe).collect();
        let mut expect_before_excl: Vec<i16> = sorted.iter().copied().filter(|v| *v < probe).collect();
        expect_before_incl.reverse();
        expect_before_excl.reverse();

        prop_assert_eq!(after_incl, sorted.iter().copied().filter(|v| *v >= probe).collect::<Vec<_>>());
        prop_assert_eq!(after_excl, sorted.iter().copied().filter(|v| *v > probe).collect::<Vec<_>>());
        prop_assert_eq!(before_incl, expect_before_incl);
        prop_assert_eq!(before_excl, expect_before_excl);
    }
}
