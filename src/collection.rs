//! Collection: the associative-container contract.
//!
//! Callers that only need insert/remove/find and the key listings can be
//! written against this trait instead of a concrete table.

use crate::chained_table::ChainedHashTable;
use core::hash::{BuildHasher, Hash};

pub trait Collection<K, V> {
    /// Insert `key`, or replace its value if already present.
    fn insert(&mut self, key: K, value: V);

    /// Remove `key` if present; absent keys are ignored.
    fn remove(&mut self, key: &K);

    /// Copy of the value stored under `key`.
    fn find(&self, key: &K) -> Option<V>;

    /// Keys in `[low, high]`, in no particular order. Empty when `low > high`.
    fn find_range(&self, low: &K, high: &K) -> Vec<K>;

    fn keys(&self) -> Vec<K>;

    /// Keys in ascending order.
    fn sort(&self) -> Vec<K>;

    fn size(&self) -> usize;
}

impl<K, V, S> Collection<K, V> for ChainedHashTable<K, V, S>
where
    K: Hash + Ord + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn insert(&mut self, key: K, value: V) {
        ChainedHashTable::insert(self, key, value);
    }

    fn remove(&mut self, key: &K) {
        ChainedHashTable::remove(self, key);
    }

    fn find(&self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn find_range(&self, low: &K, high: &K) -> Vec<K> {
        self.range_keys(low, high)
    }

    fn keys(&self) -> Vec<K> {
        ChainedHashTable::keys(self)
    }

    fn sort(&self) -> Vec<K> {
        self.sorted_keys()
    }

    fn size(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill<C: Collection<i32, String>>(c: &mut C, keys: &[i32]) {
        for &k in keys {
            c.insert(k, format!("v{}", k));
        }
    }

    #[test]
    fn trait_object_and_generic_use_agree() {
        let mut t: ChainedHashTable<i32, String> = ChainedHashTable::new();
        fill(&mut t, &[3, 1, 2]);

        let c: &dyn Collection<i32, String> = &t;
        assert_eq!(c.size(), 3);
        assert_eq!(c.find(&2), Some("v2".to_string()));
        assert_eq!(c.find(&9), None);
        assert_eq!(c.sort(), vec![1, 2, 3]);
    }

    #[test]
    fn find_copies_value_out() {
        let mut t: ChainedHashTable<i32, String> = ChainedHashTable::new();
        Collection::insert(&mut t, 1, "a".to_string());
        let mut copy = Collection::find(&t, &1).unwrap();
        copy.push('!');
        assert_eq!(t.get(&1), Some(&"a".to_string()));
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut t: ChainedHashTable<i32, String> = ChainedHashTable::new();
        fill(&mut t, &[1]);
        Collection::remove(&mut t, &5);
        assert_eq!(Collection::size(&t), 1);
        Collection::remove(&mut t, &1);
        assert_eq!(Collection::size(&t), 0);
    }
}
