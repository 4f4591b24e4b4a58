// Collection trait property tests.
//
// Property: any operation sequence applied through `Collection` matches a
// BTreeMap model.
//  - Model: BTreeMap<u16, u32>, whose key order gives exact range and
//    sort answers.
//  - Operations: insert, remove, find, find_range, keys, sort.
//  - Invariant after each step: size() == model.len().
use chained_table::{ChainedHashTable, Collection};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Find(u16),
    Range(u16, u16),
    Keys,
    Sort,
}

fn arb_op() -> impl Strategy<Value = Op> {
    // Small key space so removes and upserts hit existing keys.
    let key = 0u16..64;
    prop_oneof![
        4 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => key.clone().prop_map(Op::Remove),
        1 => key.clone().prop_map(Op::Find),
        1 => (key.clone(), key.clone()).prop_map(|(a, b)| Op::Range(a, b)),
        1 => Just(Op::Keys),
        1 => Just(Op::Sort),
    ]
}

fn check<C: Collection<u16, u32>>(c: &mut C, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model: BTreeMap<u16, u32> = BTreeMap::new();
    for op in ops {
        match op {
            Op::Insert(k, v) => {
                c.insert(k, v);
                model.insert(k, v);
            }
            Op::Remove(k) => {
                c.remove(&k);
                model.remove(&k);
            }
            Op::Find(k) => {
                prop_assert_eq!(c.find(&k), model.get(&k).copied());
            }
            Op::Range(lo, hi) => {
                let got: BTreeSet<u16> = c.find_range(&lo, &hi).into_iter().collect();
                let want: BTreeSet<u16> = if lo <= hi {
                    model.range(lo..=hi).map(|(k, _)| *k).collect()
                } else {
                    BTreeSet::new()
                };
                prop_assert_eq!(got, want);
            }
            Op::Keys => {
                let got: BTreeSet<u16> = c.keys().into_iter().collect();
                prop_assert_eq!(got.len(), model.len());
                prop_assert!(got.iter().eq(model.keys()));
            }
            Op::Sort => {
                let want: Vec<u16> = model.keys().copied().collect();
                prop_assert_eq!(c.sort(), want);
            }
        }
        prop_assert_eq!(c.size(), model.len());
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_collection_matches_btreemap(ops in proptest::collection::vec(arb_op(), 1..200)) {
        let mut t: ChainedHashTable<u16, u32> = ChainedHashTable::new();
        check(&mut t, ops)?;
    }
}
