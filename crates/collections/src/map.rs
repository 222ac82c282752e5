//! Insertion-ordered persistent map
//!
//! The record store delegates its structural work here. `OrderedMap` pairs a
//! persistent hash map (storage and lookup) with a persistent vector (key
//! order), both from `im`, so clones are O(1) and mutation through a uniquely
//! owned handle updates in place instead of copying.
//!
//! ## Contract
//!
//! - Iteration, positional access, and rendering follow *first-insertion*
//!   order: replacing a key's value keeps its original position; only
//!   removing and re-inserting moves it to the back.
//! - Equality and hash ignore order: two maps holding the same entries are
//!   equal however they were built, and hash alike. The hash folds the
//!   entries commutatively to stay order-blind.
//! - Positional operations (`index_of`, `get_index`, removal's order fixup)
//!   scan the order vector and are O(n). Records are small; nothing here is
//!   tuned for thousands of keys.

use rustc_hash::FxHasher;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A persistent hash map that remembers first-insertion order.
///
/// Mutating methods take `&mut self` in the style of `im`: persistent callers
/// clone first (O(1)) and mutate the clone; exclusively owned handles mutate
/// in place without copying shared structure.
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    entries: im::HashMap<K, V>,
    /// Every key of `entries`, exactly once, in first-insertion order.
    order: im::Vector<K>,
}

impl<K, V> OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// An empty map.
    pub fn new() -> Self {
        OrderedMap {
            entries: im::HashMap::new(),
            order: im::Vector::new(),
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present.
    pub fn contains_key<BK>(&self, key: &BK) -> bool
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        self.entries.contains_key(key)
    }

    /// The value for `key`, if present.
    pub fn get<BK>(&self, key: &BK) -> Option<&V>
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        self.entries.get(key)
    }

    /// Mutable access to the value for `key`, if present.
    ///
    /// Copies shared structure first if the map is not uniquely owned.
    pub fn get_mut<BK>(&mut self, key: &BK) -> Option<&mut V>
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        self.entries.get_mut(key)
    }

    /// Insert or replace. Returns the previous value if the key was present.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.entries.insert(key.clone(), value) {
            Some(previous) => Some(previous),
            None => {
                self.order.push_back(key);
                None
            }
        }
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove<BK>(&mut self, key: &BK) -> Option<V>
    where
        BK: Hash + Eq + ?Sized,
        K: Borrow<BK>,
    {
        let removed = self.entries.remove(key)?;
        if let Some(position) = self.order.iter().position(|k| k.borrow() == key) {
            self.order.remove(position);
        }
        Some(removed)
    }

    /// Position of `key` in insertion order, if present. O(n).
    pub fn index_of<BK>(&self, key: &BK) -> Option<usize>
    where
        BK: Eq + ?Sized,
        K: Borrow<BK>,
    {
        self.order.iter().position(|k| k.borrow() == key)
    }

    /// The entry at `index` in insertion order, if in range.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        let key = self.order.get(index)?;
        let value = self.entries.get(key)?;
        Some((key, value))
    }

    /// Iterate entries in first-insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            order: self.order.iter(),
            entries: &self.entries,
        }
    }

    /// Iterate keys in first-insertion order.
    pub fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K> + 'a {
        self.order.iter()
    }

    /// Iterate values in first-insertion order.
    pub fn values<'a>(&'a self) -> impl Iterator<Item = &'a V> + 'a {
        self.iter().map(|(_, value)| value)
    }

    /// Combine with `other`. Keys present in both are resolved by `combine`
    /// (this map's value first, `other`'s second) and keep this map's
    /// position; keys only in `other` are appended in `other`'s order.
    pub fn merge_with<F>(&self, other: &Self, mut combine: F) -> Self
    where
        F: FnMut(&V, &V) -> V,
    {
        let mut result = self.clone();
        for (key, incoming) in other.iter() {
            let merged = match result.entries.get(key) {
                Some(existing) => combine(existing, incoming),
                None => incoming.clone(),
            };
            result.insert(key.clone(), merged);
        }
        result
    }

    /// Combine with `other`, `other`'s value winning on shared keys.
    pub fn union(&self, other: &Self) -> Self {
        self.merge_with(other, |_, incoming| incoming.clone())
    }

    /// The entries of this map whose keys also appear in `other`, in this
    /// map's order.
    pub fn intersection<W: Clone>(&self, other: &OrderedMap<K, W>) -> Self {
        let mut result = OrderedMap::new();
        for (key, value) in self.iter() {
            if other.contains_key(key) {
                result.insert(key.clone(), value.clone());
            }
        }
        result
    }

    /// The entries of this map whose keys do not appear in `other`, in this
    /// map's order.
    pub fn difference<W: Clone>(&self, other: &OrderedMap<K, W>) -> Self {
        let mut result = OrderedMap::new();
        for (key, value) in self.iter() {
            if !other.contains_key(key) {
                result.insert(key.clone(), value.clone());
            }
        }
        result
    }

    /// Whether two handles share the same underlying storage. O(1); true
    /// implies equality.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.entries.ptr_eq(&other.entries)
    }
}

impl<K, V> Default for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        OrderedMap::new()
    }
}

impl<K, V> PartialEq for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: PartialEq + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        // Order is presentation, not identity.
        self.entries.ptr_eq(&other.entries) || self.entries == other.entries
    }
}

impl<K, V> Eq for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Eq + Clone,
{
}

impl<K, V> Hash for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Hash + Clone,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Commutative fold: equal maps hash alike whatever their insertion
        // order, consistent with equality ignoring order.
        let mut acc: u64 = 0;
        for (key, value) in self.iter() {
            let mut entry_hasher = FxHasher::default();
            key.hash(&mut entry_hasher);
            value.hash(&mut entry_hasher);
            acc = acc.wrapping_add(entry_hasher.finish());
        }
        state.write_usize(self.len());
        state.write_u64(acc);
    }
}

impl<K, V> fmt::Debug for OrderedMap<K, V>
where
    K: fmt::Debug + Hash + Eq + Clone,
    V: fmt::Debug + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K, V> Extend<(K, V)> for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Iterator over a map's entries in first-insertion order.
pub struct Iter<'a, K, V> {
    order: im::vector::Iter<'a, K>,
    entries: &'a im::HashMap<K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let key = self.order.next()?;
        let value = self.entries.get(key)?;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// Iterator consuming a map, yielding `(K, V)` in first-insertion order.
pub struct IntoIter<K, V> {
    order: im::Vector<K>,
    entries: im::HashMap<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let key = self.order.pop_front()?;
        let value = self.entries.remove(&key)?;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.order.len(), Some(self.order.len()))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
}

impl<K, V> IntoIterator for OrderedMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            order: self.order,
            entries: self.entries,
        }
    }
}
