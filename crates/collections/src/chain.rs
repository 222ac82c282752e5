//! Value chains: per-key stacks of record values
//!
//! Records admit duplicate keys. Every key in a record store maps to a
//! `ValueChain`, an immutable linked list whose head is the most recently
//! associated value and whose tail holds the shadowed older ones.
//!
//! ## Contract
//!
//! - A chain is never empty: it holds at least its head. "No values left"
//!   is represented by the *record* dropping the key, not by an empty chain.
//! - `prepend` is O(1) and shares the existing chain as its tail; no chain
//!   is ever mutated after construction.
//! - Equality is structural (same values, same order). Every node caches a
//!   structural hash at construction: a hash mismatch proves two chains
//!   unequal without walking them, a hash match proves nothing and is
//!   followed by a full comparison.
//! - Rendering is the head's printer form, then `, ` and the tail's
//!   rendering, with no wrapping delimiter: `2, 1`.

use crate::value::Value;
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An immutable, structurally shared chain of values for one record key.
///
/// Cloning is O(1) (one atomic increment); all construction operations leave
/// existing chains untouched.
///
/// # Examples
///
/// ```
/// use tanager_collections::{Value, ValueChain};
///
/// let first = ValueChain::singleton(Value::Int(1));
/// let both = first.prepend(Value::Int(2));
/// assert_eq!(both.head(), &Value::Int(2));
/// assert_eq!(both.len(), 2);
/// assert_eq!(first.len(), 1);
/// ```
#[derive(Clone)]
pub struct ValueChain {
    node: Arc<ChainNode>,
}

struct ChainNode {
    head: Value,
    /// Values in this chain, counting the head. Always >= 1.
    len: usize,
    /// Structural hash over head and tail, cached at construction.
    hash: u64,
    rest: Option<ValueChain>,
}

impl ValueChain {
    fn new(head: Value, rest: Option<ValueChain>) -> ValueChain {
        let len = 1 + rest.as_ref().map_or(0, |tail| tail.len());
        let mut hasher = FxHasher::default();
        head.hash(&mut hasher);
        if let Some(tail) = &rest {
            hasher.write_u64(tail.node.hash);
        }
        let hash = hasher.finish();
        ValueChain {
            node: Arc::new(ChainNode {
                head,
                len,
                hash,
                rest,
            }),
        }
    }

    /// A one-value chain.
    pub fn singleton(value: Value) -> ValueChain {
        ValueChain::new(value, None)
    }

    /// A new chain with `value` in front and this chain as the tail.
    ///
    /// O(1); shares this chain rather than copying it.
    pub fn prepend(&self, value: Value) -> ValueChain {
        ValueChain::new(value, Some(self.clone()))
    }

    /// A new chain with this chain's head replaced and its tail kept.
    pub fn with_head(&self, value: Value) -> ValueChain {
        ValueChain::new(value, self.tail().cloned())
    }

    /// The most recently associated value.
    pub fn head(&self) -> &Value {
        &self.node.head
    }

    /// The chain after dropping the head, or `None` if the head was the only
    /// value.
    pub fn tail(&self) -> Option<&ValueChain> {
        self.node.rest.as_ref()
    }

    /// Number of values in the chain. Always at least 1.
    pub fn len(&self) -> usize {
        self.node.len
    }

    /// This chain's values followed by `other`'s, order preserved.
    ///
    /// Shares `other` as the tail of the result, so the cost is proportional
    /// to `self.len()` only.
    pub fn concat(&self, other: &ValueChain) -> ValueChain {
        let front: SmallVec<[&Value; 8]> = self.iter().collect();
        let mut result = other.clone();
        for value in front.iter().rev() {
            result = result.prepend((*value).clone());
        }
        result
    }

    /// Iterate the values, head (most recent) first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: Some(self.node.as_ref()),
            remaining: self.len(),
        }
    }

    /// Whether two handles point at the same chain node.
    pub fn ptr_eq(&self, other: &ValueChain) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl PartialEq for ValueChain {
    fn eq(&self, other: &ValueChain) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        // Cached hashes: mismatch is a definite inequality. A match proves
        // nothing; fall through to the element walk.
        if self.node.len != other.node.len || self.node.hash != other.node.hash {
            return false;
        }
        self.iter().eq(other.iter())
    }
}

impl Eq for ValueChain {}

impl Hash for ValueChain {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.node.hash);
    }
}

impl fmt::Display for ValueChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ValueChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// Tear the spine down iteratively: a chain is as deep as it is long, and the
// default recursive drop would overflow the stack on long chains.
impl Drop for ChainNode {
    fn drop(&mut self) {
        let mut rest = self.rest.take();
        while let Some(chain) = rest {
            match Arc::try_unwrap(chain.node) {
                Ok(mut node) => rest = node.rest.take(),
                // Tail is shared; the other owner keeps it alive.
                Err(_) => break,
            }
        }
    }
}

/// Iterator over a chain's values, most recent first.
pub struct Iter<'a> {
    next: Option<&'a ChainNode>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        let node = self.next?;
        self.next = node.rest.as_ref().map(|chain| chain.node.as_ref());
        self.remaining -= 1;
        Some(&node.head)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a ValueChain {
    type Item = &'a Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
