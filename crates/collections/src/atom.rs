//! Shared mutable cells over immutable values
//!
//! The language's values are immutable; `Atom` is the one sanctioned way to
//! share mutable state between parts of a program. It holds a value behind a
//! lock and replaces it wholesale, Clojure-atom style. Because the values
//! themselves are persistent structures, `deref`'s clone is O(1) and `swap`
//! holds the lock only for the duration of the update function.

use parking_lot::RwLock;
use std::fmt;

/// A thread-safe mutable cell holding an immutable value.
///
/// # Examples
///
/// ```
/// use tanager_collections::Atom;
///
/// let counter = Atom::new(0i64);
/// counter.swap(|n| n + 1);
/// assert_eq!(counter.deref(), 1);
/// ```
pub struct Atom<T> {
    state: RwLock<T>,
}

impl<T: Clone> Atom<T> {
    /// A new atom holding `value`.
    pub fn new(value: T) -> Atom<T> {
        Atom {
            state: RwLock::new(value),
        }
    }

    /// A snapshot of the current value.
    pub fn deref(&self) -> T {
        self.state.read().clone()
    }

    /// Replace the current value, returning the new one.
    pub fn reset(&self, value: T) -> T {
        *self.state.write() = value.clone();
        value
    }

    /// Replace the current value with `f` applied to it, returning the new
    /// value.
    ///
    /// `f` runs exactly once, under the write lock; concurrent `swap`s
    /// serialize rather than retry.
    pub fn swap<F>(&self, f: F) -> T
    where
        F: FnOnce(&T) -> T,
    {
        let mut guard = self.state.write();
        let next = f(&guard);
        *guard = next.clone();
        next
    }

    /// Consume the atom, returning the value inside.
    pub fn into_inner(self) -> T {
        self.state.into_inner()
    }
}

impl<T: Clone + Default> Default for Atom<T> {
    fn default() -> Atom<T> {
        Atom::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Atom<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Atom").field(&*self.state.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::value::Value;
    use std::sync::Arc;

    #[test]
    fn test_deref_returns_current_value() {
        let atom = Atom::new(41i64);
        assert_eq!(atom.deref(), 41);
    }

    #[test]
    fn test_reset_replaces_and_returns_new() {
        let atom = Atom::new(1i64);
        assert_eq!(atom.reset(5), 5);
        assert_eq!(atom.deref(), 5);
    }

    #[test]
    fn test_swap_applies_function() {
        let atom = Atom::new(10i64);
        assert_eq!(atom.swap(|n| n * 2), 20);
        assert_eq!(atom.deref(), 20);
    }

    #[test]
    fn test_swap_over_record_state() {
        let atom = Atom::new(Record::new());
        atom.swap(|rec| rec.assoc("hits", Value::Int(1)));
        atom.swap(|rec| rec.update("hits", |v| Value::Int(v.as_int().unwrap() + 1)));
        assert_eq!(atom.deref()["hits"], Value::Int(2));
    }

    #[test]
    fn test_concurrent_swaps_serialize() {
        let atom = Arc::new(Atom::new(0i64));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let atom = Arc::clone(&atom);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        atom.swap(|n| n + 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(atom.deref(), 800);
    }

    #[test]
    fn test_default() {
        let atom: Atom<i64> = Atom::default();
        assert_eq!(atom.deref(), 0);
    }

    #[test]
    fn test_into_inner() {
        let atom = Atom::new(Record::new().assoc("k", Value::Int(1)));
        let rec = atom.into_inner();
        assert_eq!(rec["k"], Value::Int(1));
    }
}
