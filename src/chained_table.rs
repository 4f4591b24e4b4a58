//! ChainedHashTable: separate chaining over an arena of entries.
//!
//! Each bucket holds the arena key of the first entry in its chain and
//! each entry holds the key of the next one. Unlinking and relinking only
//! patch `Option<DefaultKey>` fields; entries never move in memory.

use crate::config::TableConfig;
use crate::error::{ConfigError, TableError};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use log::{debug, trace};
use slotmap::{DefaultKey, SlotMap};

type Link = Option<DefaultKey>;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    // Cached so rehashing never calls back into `K: Hash`.
    hash: u64,
    next: Link,
}

/// Bucket heads plus the arena they link into.
struct Chains<K, V> {
    buckets: Vec<Link>,
    entries: SlotMap<DefaultKey, Entry<K, V>>,
}

impl<K, V> Chains<K, V> {
    fn with_buckets(capacity: usize, entries: usize) -> Self {
        Self {
            buckets: vec![None; capacity],
            entries: SlotMap::with_capacity_and_key(entries),
        }
    }

    /// Same as `with_buckets`, but both the bucket array and the arena are
    /// reserved fallibly.
    fn try_with_buckets(capacity: usize, entries: usize) -> Result<Self, TableError> {
        let buckets = try_alloc_buckets(capacity)?;
        let mut arena = SlotMap::with_key();
        arena.try_reserve(entries)?;
        Ok(Self {
            buckets,
            entries: arena,
        })
    }

    fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Walks the single chain `hash` selects. Empty bucket means absent.
    fn find<Q>(&self, hash: u64, q: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut cur = self.buckets[bucket_index(hash, self.capacity())];
        while let Some(k) = cur {
            let e = &self.entries[k];
            if e.hash == hash && e.key.borrow() == q {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    /// Prepends a new entry to its chain. The key must not be present.
    fn link(&mut self, hash: u64, key: K, value: V) {
        let idx = bucket_index(hash, self.capacity());
        let next = self.buckets[idx];
        let k = self.entries.insert(Entry {
            key,
            value,
            hash,
            next,
        });
        self.buckets[idx] = Some(k);
    }

    /// Detaches the matching entry from its chain and the arena. Head and
    /// interior nodes differ only in which link gets patched.
    fn unlink<Q>(&mut self, hash: u64, q: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let idx = bucket_index(hash, self.capacity());
        let mut prev: Link = None;
        let mut cur = self.buckets[idx];
        while let Some(k) = cur {
            let e = &self.entries[k];
            if e.hash == hash && e.key.borrow() == q {
                let next = e.next;
                match prev {
                    None => self.buckets[idx] = next,
                    Some(p) => self.entries[p].next = next,
                }
                return self.entries.remove(k);
            }
            prev = cur;
            cur = e.next;
        }
        None
    }

    /// Relinks every entry into `grown`. Cannot fail and runs no user code,
    /// so once the new array exists the swap is all-or-nothing.
    fn rehash_into(&mut self, mut grown: Vec<Link>) {
        let capacity = grown.len();
        debug!(
            "growing table from {} to {} buckets ({} entries)",
            self.capacity(),
            capacity,
            self.entries.len()
        );
        let old = mem::take(&mut self.buckets);
        for head in old {
            let mut cur = head;
            while let Some(k) = cur {
                let e = &mut self.entries[k];
                cur = e.next;
                let idx = bucket_index(e.hash, capacity);
                e.next = grown[idx];
                grown[idx] = Some(k);
            }
        }
        self.buckets = grown;
    }

    /// Links a copy of every entry of `source`, rehashing keys with
    /// `hasher`. `self` must be empty and have `source`'s capacity.
    fn refill_from<S: BuildHasher>(&mut self, hasher: &S, source: &Self)
    where
        K: Hash + Clone,
        V: Clone,
    {
        for e in source.entries.values() {
            self.link(hasher.hash_one(&e.key), e.key.clone(), e.value.clone());
        }
    }

    fn clear(&mut self) {
        trace!(
            "clearing {} entries from {} buckets",
            self.entries.len(),
            self.capacity()
        );
        self.buckets.fill(None);
        self.entries.clear();
    }
}

/// Hash table with separate chaining, upsert semantics and doubling growth.
///
/// Not `Sync`: a table shared between threads must be wrapped in a lock by
/// the caller (`Mutex<ChainedHashTable<..>>`).
pub struct ChainedHashTable<K, V, S = DefaultHashBuilder> {
    hasher: S,
    chains: Chains<K, V>,
    load_factor: f64,
    reentrancy: DebugReentrancy,
}

#[inline]
fn bucket_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

fn try_alloc_buckets(capacity: usize) -> Result<Vec<Link>, TableError> {
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(capacity)?;
    buckets.resize(capacity, None);
    Ok(buckets)
}
impl<K, V> ChainedHashTable<K, V>
where
    K: Eq + Hash,
{
    /// Empty table with 16 buckets and a 0.75 growth threshold.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl<K, V, S> Default for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ChainedHashTable<K, V, S> {
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.chains.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.entries.is_empty()
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.chains.capacity()
    }

    /// Current ratio of entries to buckets.
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    pub fn load_factor_threshold(&self) -> f64 {
        self.load_factor
    }

    /// Iterates `(key, value)` in bucket order, then chain order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.chains.buckets.iter(),
            entries: &self.chains.entries,
            cur: None,
            remaining: self.len(),
        }
    }

    /// Iterates with mutable values. Order is unspecified and may differ
    /// from `iter`.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.chains.entries.values_mut(),
        }
    }

    /// Drops every entry. The bucket count is kept.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        self.chains.clear();
    }

    fn needs_growth(&self, capacity: usize) -> bool {
        (self.len() + 1) as f64 / capacity as f64 > self.load_factor
    }

    /// Smallest doubling of the current capacity that keeps the table at or
    /// under its threshold after one more entry.
    fn grown_capacity(&self) -> usize {
        let mut capacity = self.capacity() * 2;
        while self.needs_growth(capacity) {
            capacity *= 2;
        }
        capacity
    }
}

impl<K, V, S> ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_validated(TableConfig::default(), hasher)
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config, hasher))
    }

    /// `config` must already have passed `TableConfig::validate`.
    fn from_validated(config: TableConfig, hasher: S) -> Self {
        Self {
            hasher,
            chains: Chains::with_buckets(config.initial_capacity, 0),
            load_factor: config.load_factor,
            reentrancy: DebugReentrancy::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.chains.find(hash, q).map(|k| &self.chains.entries[k].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let k = self.chains.find(hash, q)?;
        self.chains.entries.get_mut(k).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.chains.find(hash, q).is_some()
    }

    /// Upsert. Replaces and returns the old value when `key` is present;
    /// otherwise grows if the new entry would exceed the threshold, then
    /// links the entry into its bucket.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        if let Some(k) = self.chains.find(hash, &key) {
            return Some(mem::replace(&mut self.chains.entries[k].value, value));
        }
        if self.needs_growth(self.capacity()) {
            let grown = vec![None; self.grown_capacity()];
            self.chains.rehash_into(grown);
        }
        self.chains.link(hash, key, value);
        None
    }

    /// Like `insert`, but reports failure to allocate the arena slot or a
    /// larger bucket array instead of aborting. On error the table is
    /// unchanged and `key` was not inserted.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        if let Some(k) = self.chains.find(hash, &key) {
            return Ok(Some(mem::replace(&mut self.chains.entries[k].value, value)));
        }
        // Reserved up front so `link` below cannot allocate.
        self.chains.entries.try_reserve(1)?;
        if self.needs_growth(self.capacity()) {
            let grown = try_alloc_buckets(self.grown_capacity())?;
            self.chains.rehash_into(grown);
        }
        self.chains.link(hash, key, value);
        Ok(None)
    }

    /// Removes `q` if present. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let guard = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let Entry { key, value, .. } = self.chains.unlink(hash, q)?;
        // Structure is consistent again; dropping the key may reenter.
        drop(guard);
        drop(key);
        Some(value)
    }

    /// Deep copy that reports allocation failure of the bucket array or the
    /// entry arena instead of aborting. Nothing is allocated after both
    /// reservations succeed.
    pub fn try_clone(&self) -> Result<Self, TableError>
    where
        K: Clone,
        V: Clone,
        S: Clone,
    {
        let chains = Chains::try_with_buckets(self.capacity(), self.len())?;
        Ok(self.rebuild_with(chains))
    }

    /// Fresh table with the same hasher and threshold over `chains`, which
    /// must be empty with room for every entry, filled by re-inserting
    /// every pair.
    fn rebuild_with(&self, chains: Chains<K, V>) -> Self
    where
        K: Clone,
        V: Clone,
        S: Clone,
    {
        trace!("deep-copying {} entries", self.len());
        let mut copy = Self {
            hasher: self.hasher.clone(),
            chains,
            load_factor: self.load_factor,
            reentrancy: DebugReentrancy::new(),
        };
        {
            let _g = copy.reentrancy.enter();
            copy.chains.refill_from(&copy.hasher, &self.chains);
        }
        copy
    }
}

impl<K, V, S> ChainedHashTable<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Every key once, bucket order then chain order.
    pub fn keys(&self) -> Vec<K> {
        let _g = self.reentrancy.enter();
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Every key in ascending order.
    pub fn sorted_keys(&self) -> Vec<K>
    where
        K: Ord,
    {
        let mut keys = self.keys();
        keys.sort();
        keys
    }

    /// Keys `k` with `low <= k <= high`, found by scanning every chain.
    /// Inverted bounds yield an empty list.
    pub fn range_keys<Q>(&self, low: &Q, high: &Q) -> Vec<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let _g = self.reentrancy.enter();
        if low > high {
            return Vec::new();
        }
        self.iter()
            .map(|(k, _)| k)
            .filter(|&k| {
                let k = <K as Borrow<Q>>::borrow(k);
                low <= k && k <= high
            })
            .cloned()
            .collect()
    }
}

impl<K, V, S> Clone for ChainedHashTable<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        self.rebuild_with(Chains::with_buckets(self.capacity(), self.len()))
    }

    /// Drops the current contents, then re-inserts `source`'s pairs. A
    /// table cannot be passed as its own source (`&mut` excludes it).
    fn clone_from(&mut self, source: &Self) {
        let _g = self.reentrancy.enter();
        self.chains.clear();
        trace!("deep-copying {} entries into existing table", source.len());
        self.hasher = source.hasher.clone();
        self.load_factor = source.load_factor;
        self.chains.buckets.clear();
        self.chains.buckets.resize(source.capacity(), None);
        self.chains.refill_from(&self.hasher, &source.chains);
    }
}

impl<K, V, S> fmt::Debug for ChainedHashTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Space-separated keys in iteration order.
impl<K, V, S> fmt::Display for ChainedHashTable<K, V, S>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, _)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", k)?;
        }
        Ok(())
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::with_hasher(S::default());
        table.extend(iter);
        table
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(&K, &V)` in bucket order, then chain order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Link>,
    entries: &'a SlotMap<DefaultKey, Entry<K, V>>,
    cur: Link,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur {
                let e = &self.entries[k];
                self.cur = e.next;
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            // Empty buckets are skipped without touching the arena.
            self.cur = *self.buckets.next()?;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)` in arena order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::ValuesMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| (&e.key, &mut e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

#[cfg(test)]
impl<K, V, S> ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Panics unless every structural invariant holds: each entry sits in
    /// the bucket its hash selects, the reachable count equals `len`, keys
    /// are unique, and the load factor is within the threshold.
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.capacity();
        let mut reachable = Vec::new();
        for (idx, head) in self.chains.buckets.iter().enumerate() {
            let mut cur = *head;
            while let Some(k) = cur {
                let e = &self.chains.entries[k];
                assert_eq!(e.hash, self.make_hash(&e.key), "stale cached hash");
                assert_eq!(bucket_index(e.hash, capacity), idx, "entry in wrong bucket");
                reachable.push(&e.key);
                cur = e.next;
            }
        }
        assert_eq!(reachable.len(), self.len(), "unreachable entries");
        for (i, a) in reachable.iter().enumerate() {
            for b in &reachable[i + 1..] {
                assert!(a != b, "duplicate key");
            }
        }
        assert!(
            self.load_factor() <= self.load_factor_threshold(),
            "load factor {} above threshold {}",
            self.load_factor(),
            self.load_factor_threshold()
        );
    }
}
