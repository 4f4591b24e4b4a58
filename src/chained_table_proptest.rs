#![cfg(test)]

// Property tests for ChainedHashTable kept inside the crate so they can
// check internal structure (bucket placement, reachable count) after
// every operation.

use crate::chained_table::ChainedHashTable;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup and ranges.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    TryInsert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Range(usize, usize),
    Keys,
    Sorted,
    Clear,
    CloneAndDiverge(usize, i32),
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::TryInsert(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => (idx.clone(), idx.clone()).prop_map(|(a, b)| Op::Range(a, b)),
            1 => Just(Op::Keys),
            1 => Just(Op::Sorted),
            1 => Just(Op::Clear),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::CloneAndDiverge(i, v)),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drives the table and a std HashMap model through the same operations.
// After every step: structural invariants hold, sizes match, and the
// capacity has not shrunk.
fn run_state_machine<S>(
    mut sut: ChainedHashTable<Key, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut last_capacity = sut.capacity();

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.insert(k.clone(), v), model.insert(k, v));
            }
            Op::TryInsert(i, v) => {
                let k = key_from(pool, i);
                let got = sut.try_insert(k.clone(), v).expect("allocation succeeds");
                prop_assert_eq!(got, model.insert(k, v));
            }
            Op::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
            }
            Op::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            Op::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            Op::Mutate(i, d) => {
                let k = key_from(pool, i);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(a), Some(b)) => {
                        *a = a.saturating_add(d);
                        *b = b.saturating_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut presence differs from model"),
                }
            }
            Op::Range(a, b) => {
                let (lo, hi) = (pool[a].as_str(), pool[b].as_str());
                let got: BTreeSet<Key> = sut.range_keys(lo, hi).into_iter().collect();
                let want: BTreeSet<Key> = model
                    .keys()
                    .filter(|k| lo <= k.0.as_str() && k.0.as_str() <= hi)
                    .cloned()
                    .collect();
                if lo > hi {
                    prop_assert!(got.is_empty());
                }
                prop_assert_eq!(got, want);
            }
            Op::Keys => {
                let keys = sut.keys();
                prop_assert_eq!(keys.len(), model.len());
                let set: BTreeSet<Key> = keys.into_iter().collect();
                let m_keys: BTreeSet<Key> = model.keys().cloned().collect();
                prop_assert_eq!(set, m_keys);
            }
            Op::Sorted => {
                let mut want: Vec<Key> = model.keys().cloned().collect();
                want.sort();
                prop_assert_eq!(sut.sorted_keys(), want);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
            Op::CloneAndDiverge(i, v) => {
                let mut copy = sut.clone();
                copy.assert_invariants();
                prop_assert_eq!(copy.sorted_keys(), sut.sorted_keys());
                let k = key_from(pool, i);
                copy.insert(k.clone(), v);
                copy.remove(&key_from(pool, 0));
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.capacity() >= last_capacity, "capacity shrank");
        last_capacity = sut.capacity();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(ChainedHashTable::new(), &pool, ops)?;
    }
}

// Every key hashes to zero, so every entry shares one chain.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Same model check under worst-case chaining: head, interior and tail
// unlinks and relinking during growth all happen inside one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(ChainedHashTable::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

// Property: for distinct integer keys, capacity is the smallest power-of-two
// multiple of 16 that keeps len / capacity <= 0.75, and growth never loses
// an entry.
proptest! {
    #[test]
    fn prop_growth_is_minimal_and_lossless(keys in proptest::collection::btree_set(any::<u32>(), 0..300)) {
        let mut t: ChainedHashTable<u32, u32> = ChainedHashTable::new();
        for &k in &keys {
            t.insert(k, k ^ 0xa5a5);
        }
        let mut expected = 16usize;
        while keys.len() as f64 / expected as f64 > 0.75 {
            expected *= 2;
        }
        prop_assert_eq!(t.capacity(), expected);
        prop_assert_eq!(t.len(), keys.len());
        for &k in &keys {
            prop_assert_eq!(t.get(&k), Some(&(k ^ 0xa5a5)));
        }
        let sorted: Vec<u32> = keys.iter().copied().collect();
        prop_assert_eq!(t.sorted_keys(), sorted);
    }
}
