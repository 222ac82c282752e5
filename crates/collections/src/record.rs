//! The record store: duplicate-key records for the language runtime
//!
//! Tanager records admit duplicate keys: associating a key that is already
//! present does not replace the old value, it *shadows* it. Each key maps to
//! a [`ValueChain`] whose head is the live value and whose tail is the
//! shadowed history, so dropping a key's head un-shadows the previous value.
//!
//! ## Contract
//!
//! - `assoc` prepends to the key's chain (or starts one); `dissoc` pops one
//!   value and removes the key only when its chain is exhausted; `set` and
//!   `update` replace the head and preserve the shadowed tail.
//! - Keys are interned on every write; lookups compare interned keys pointer
//!   first.
//! - Iteration and rendering follow first-insertion order. Equality and hash
//!   ignore that order: records with the same keys mapping to structurally
//!   equal chains are equal however they were built. Order *within* one
//!   key's chain always matters.
//! - `len` counts distinct keys, not chained values.
//! - Rendering is `key:` followed by the chain's rendering, entries joined
//!   by `, `, with no enclosing delimiter: `a:1, b:2`. Sibling sequence
//!   types wrap their rendering; records deliberately do not.
//!
//! ## Persistent and linear stores
//!
//! [`Record`] is immutable: every mutator borrows the receiver and returns a
//! new record, sharing all untouched structure. [`LinearRecord`] is the
//! single-owner construction form: mutators take `&mut self` and update in
//! place, it is not `Clone`, and [`LinearRecord::forked`] consumes it to
//! produce an immutable [`Record`]. Ownership makes the mode discipline
//! static: there is no way to retain, alias, or print a builder after
//! freezing it, so the no-op transitions (`forked` of a persistent store,
//! `linear` of a linear one) have no methods to call.
//!
//! Building through a `LinearRecord` avoids the clone-per-operation cost:
//! batch construction mutates unshared structure directly.

use crate::chain::ValueChain;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::map::OrderedMap;
use crate::value::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops;

/// An immutable, insertion-ordered record with duplicate-key chains.
///
/// Cloning is O(1). Every mutating method leaves the receiver untouched and
/// returns the updated record.
///
/// # Examples
///
/// ```
/// use tanager_collections::{Record, Value};
///
/// let store = Record::new()
///     .assoc("name", Value::from("Ann"))
///     .assoc("age", Value::Int(30))
///     .assoc("name", Value::from("Bob"));
///
/// assert_eq!(store["name"], Value::from("Bob"));
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.dissoc("name")["name"], Value::from("Ann"));
/// ```
#[derive(Clone)]
pub struct Record {
    entries: OrderedMap<Key, ValueChain>,
}

impl Record {
    /// An empty record.
    pub fn new() -> Record {
        Record {
            entries: OrderedMap::new(),
        }
    }

    /// Build a record from `(key, value)` pairs, associating left to right.
    ///
    /// Repeated keys chain in the usual way: the rightmost occurrence ends
    /// up as the live value.
    pub fn from_entries<K, V, I>(entries: I) -> Record
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut draft = Record::new().linear();
        for (key, value) in entries {
            draft.assoc(key.as_ref(), value.into());
        }
        draft.forked()
    }

    /// Number of distinct keys. Chained duplicates do not count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The live (most recently associated) value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|chain| chain.head())
    }

    /// The live value for `key`, or `default` if the key is absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(default)
    }

    /// The live value for `key`, or [`Error::MissingKey`].
    pub fn try_get(&self, key: &str) -> Result<&Value> {
        self.get(key)
            .ok_or_else(|| Error::MissingKey(Key::intern(key)))
    }

    /// The full chain for `key`: live value first, shadowed history behind.
    pub fn chain(&self, key: &str) -> Option<&ValueChain> {
        self.entries.get(key)
    }

    /// Position of `key` in insertion order. O(n).
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.entries.index_of(key)
    }

    /// The entry at `index` in insertion order, if in range.
    pub fn get_index(&self, index: usize) -> Option<(&Key, &ValueChain)> {
        self.entries.get_index(index)
    }

    /// The entry at `index`, or [`Error::IndexOutOfBounds`].
    pub fn try_get_index(&self, index: usize) -> Result<(&Key, &ValueChain)> {
        self.entries.get_index(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.len(),
        })
    }

    /// Associate `key` with `value`.
    ///
    /// If the key is present the value shadows the current one (the chain
    /// grows); otherwise the key is appended in insertion order with a
    /// singleton chain. Never fails and never replaces.
    pub fn assoc(&self, key: &str, value: Value) -> Record {
        let key = Key::intern(key);
        let chain = match self.entries.get(key.as_str()) {
            Some(existing) => existing.prepend(value),
            None => ValueChain::singleton(value),
        };
        let mut entries = self.entries.clone();
        entries.insert(key, chain);
        Record { entries }
    }

    /// Drop the live value for `key`, un-shadowing the previous one.
    ///
    /// When the chain holds a single value the key disappears entirely.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent. The type checker rules this out for
    /// compiled programs; reaching the panic means the caller broke the
    /// record typing contract.
    pub fn dissoc(&self, key: &str) -> Record {
        let mut entries = self.entries.clone();
        match self.expect_chain(key).tail() {
            Some(tail) => {
                entries.insert(Key::intern(key), tail.clone());
            }
            None => {
                entries.remove(key);
            }
        }
        Record { entries }
    }

    /// Replace the live value for `key`, keeping its shadowed history.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn set(&self, key: &str, value: Value) -> Record {
        let chain = self.expect_chain(key).with_head(value);
        let mut entries = self.entries.clone();
        entries.insert(Key::intern(key), chain);
        Record { entries }
    }

    /// Replace the live value for `key` with `f` applied to it, keeping the
    /// shadowed history.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn update<F>(&self, key: &str, f: F) -> Record
    where
        F: FnOnce(&Value) -> Value,
    {
        let current = self.expect_chain(key);
        let chain = current.with_head(f(current.head()));
        let mut entries = self.entries.clone();
        entries.insert(Key::intern(key), chain);
        Record { entries }
    }

    /// Insert or replace the *entire* chain for `key`.
    ///
    /// This is the raw map-level write: unlike [`Record::assoc`] it never
    /// chains, and unlike [`Record::set`] it discards any shadowed history.
    pub fn put_chain(&self, key: &str, chain: ValueChain) -> Record {
        let mut entries = self.entries.clone();
        entries.insert(Key::intern(key), chain);
        Record { entries }
    }

    /// Remove `key` and every chained value under it.
    ///
    /// Absent keys are a no-op, matching the map-level remove; contrast
    /// [`Record::dissoc`], which pops one value and requires presence.
    pub fn remove(&self, key: &str) -> Record {
        let mut entries = self.entries.clone();
        entries.remove(key);
        Record { entries }
    }

    /// Combine with `other`: keys in both records resolve their chains with
    /// `combine` (this record's chain first), keys only in `other` are
    /// appended in `other`'s order.
    pub fn merge<F>(&self, other: &Record, combine: F) -> Record
    where
        F: FnMut(&ValueChain, &ValueChain) -> ValueChain,
    {
        Record {
            entries: self.entries.merge_with(&other.entries, combine),
        }
    }

    /// Combine with `other`, concatenating chains on shared keys (this
    /// record's values in front, still most-recent-first within each side).
    pub fn merge_concat(&self, other: &Record) -> Record {
        self.merge(other, |left, right| left.concat(right))
    }

    /// Combine with `other`, `other`'s whole chain winning on shared keys.
    pub fn union(&self, other: &Record) -> Record {
        Record {
            entries: self.entries.union(&other.entries),
        }
    }

    /// The entries of this record whose keys also appear in `other`.
    pub fn intersection(&self, other: &Record) -> Record {
        Record {
            entries: self.entries.intersection(&other.entries),
        }
    }

    /// The entries of this record whose keys do not appear in `other`.
    pub fn difference(&self, other: &Record) -> Record {
        Record {
            entries: self.entries.difference(&other.entries),
        }
    }

    /// A record with every chain replaced by `f(key, chain)`. Key set and
    /// order are preserved.
    pub fn map_values<F>(&self, mut f: F) -> Record
    where
        F: FnMut(&Key, &ValueChain) -> ValueChain,
    {
        Record {
            entries: self
                .iter()
                .map(|(key, chain)| (key.clone(), f(key, chain)))
                .collect(),
        }
    }

    /// Iterate `(key, chain)` entries in first-insertion order.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (&'a Key, &'a ValueChain)> + 'a {
        self.entries.iter()
    }

    /// Iterate keys in first-insertion order.
    pub fn keys<'a>(&'a self) -> impl Iterator<Item = &'a Key> + 'a {
        self.entries.keys()
    }

    /// Iterate chains in first-insertion order.
    pub fn values<'a>(&'a self) -> impl Iterator<Item = &'a ValueChain> + 'a {
        self.entries.values()
    }

    /// Begin single-owner construction from this record's current state.
    ///
    /// O(1); the original record is unaffected by anything done to the
    /// builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use tanager_collections::{Record, Value};
    ///
    /// let mut draft = Record::new().linear();
    /// draft.assoc("k", Value::Int(1));
    /// draft.assoc("k", Value::Int(2));
    /// let frozen = draft.forked();
    /// assert_eq!(frozen["k"], Value::Int(2));
    /// ```
    pub fn linear(&self) -> LinearRecord {
        LinearRecord {
            entries: self.entries.clone(),
        }
    }

    /// Whether two handles share the same underlying storage. O(1); true
    /// implies equality.
    pub fn ptr_eq(&self, other: &Record) -> bool {
        self.entries.ptr_eq(&other.entries)
    }

    fn expect_chain(&self, key: &str) -> &ValueChain {
        match self.entries.get(key) {
            Some(chain) => chain,
            None => panic!("record has no key {key:?}"),
        }
    }
}

impl Default for Record {
    fn default() -> Record {
        Record::new()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Record) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.hash(state)
    }
}

/// Unchecked access to the live value for `key`.
///
/// # Panics
///
/// Panics if `key` is absent; see [`Record::dissoc`] on why presence is the
/// caller's contract. Use [`Record::get`] for checked access.
impl ops::Index<&str> for Record {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.expect_chain(key).head()
    }
}

/// Unchecked access through an already-interned key.
impl ops::Index<&Key> for Record {
    type Output = Value;

    fn index(&self, key: &Key) -> &Value {
        self.expect_chain(key.as_str()).head()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: AsRef<str>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Record {
        Record::from_entries(iter)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, chain)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}:{chain}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, chain)| (key.as_str(), chain)))
            .finish()
    }
}

/// A record under single-owner construction.
///
/// Produced by [`Record::linear`]; frozen by [`LinearRecord::forked`].
/// Mutators update in place through `&mut self`, so batch construction does
/// not pay the persistent clone-per-operation cost. Not `Clone`: exactly one
/// owner exists until the builder is consumed.
pub struct LinearRecord {
    entries: OrderedMap<Key, ValueChain>,
}

impl LinearRecord {
    /// Freeze the builder into an immutable [`Record`]. O(1).
    pub fn forked(self) -> Record {
        Record {
            entries: self.entries,
        }
    }

    /// Number of distinct keys so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the builder holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The live value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|chain| chain.head())
    }

    /// The full chain for `key`.
    pub fn chain(&self, key: &str) -> Option<&ValueChain> {
        self.entries.get(key)
    }

    /// Associate `key` with `value`, shadowing any current value.
    pub fn assoc(&mut self, key: &str, value: Value) {
        let key = Key::intern(key);
        let chain = match self.entries.get(key.as_str()) {
            Some(existing) => existing.prepend(value),
            None => ValueChain::singleton(value),
        };
        self.entries.insert(key, chain);
    }

    /// Drop the live value for `key`, un-shadowing the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn dissoc(&mut self, key: &str) {
        let remainder = match self.entries.get(key) {
            Some(chain) => chain.tail().cloned(),
            None => panic!("record has no key {key:?}"),
        };
        match remainder {
            Some(tail) => {
                self.entries.insert(Key::intern(key), tail);
            }
            None => {
                self.entries.remove(key);
            }
        }
    }

    /// Replace the live value for `key`, keeping its shadowed history.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn set(&mut self, key: &str, value: Value) {
        let chain = match self.entries.get(key) {
            Some(current) => current.with_head(value),
            None => panic!("record has no key {key:?}"),
        };
        self.entries.insert(Key::intern(key), chain);
    }

    /// Replace the live value for `key` with `f` applied to it.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent.
    pub fn update<F>(&mut self, key: &str, f: F)
    where
        F: FnOnce(&Value) -> Value,
    {
        let chain = match self.entries.get(key) {
            Some(current) => current.with_head(f(current.head())),
            None => panic!("record has no key {key:?}"),
        };
        self.entries.insert(Key::intern(key), chain);
    }

    /// Merge `other` into the builder: keys in both resolve their chains
    /// with `combine` (the builder's chain first), keys only in `other` are
    /// appended in `other`'s order.
    pub fn merge_from<F>(&mut self, other: &Record, combine: F)
    where
        F: FnMut(&ValueChain, &ValueChain) -> ValueChain,
    {
        self.entries = self.entries.merge_with(&other.entries, combine);
    }

    /// Insert or replace the entire chain for `key`.
    pub fn put_chain(&mut self, key: &str, chain: ValueChain) {
        self.entries.insert(Key::intern(key), chain);
    }

    /// Remove `key` and every chained value under it. Absent keys are a
    /// no-op.
    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn expect_chain(&self, key: &str) -> &ValueChain {
        match self.entries.get(key) {
            Some(chain) => chain,
            None => panic!("record has no key {key:?}"),
        }
    }
}

/// Unchecked access to the live value for `key`.
///
/// # Panics
///
/// Panics if `key` is absent. Use [`LinearRecord::get`] for checked access.
impl ops::Index<&str> for LinearRecord {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.expect_chain(key).head()
    }
}

/// Unchecked access through an already-interned key.
impl ops::Index<&Key> for LinearRecord {
    type Output = Value;

    fn index(&self, key: &Key) -> &Value {
        self.expect_chain(key.as_str()).head()
    }
}

impl fmt::Debug for LinearRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, chain)| (key.as_str(), chain)))
            .finish()
    }
}
