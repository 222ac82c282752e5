//! Interned record keys
//!
//! Record fields are labelled by small identifier-like strings that recur
//! across the whole program (every instance of a record type repeats the same
//! labels). Keys are therefore interned: one shared allocation per distinct
//! name, process-wide.
//!
//! ## Contract
//!
//! - Interning is canonical: two `Key`s built from equal strings share the
//!   same allocation for the life of the process.
//! - Equality is *content* equality. The pointer comparison is only a fast
//!   path; a `Key` built around a non-interned allocation would still compare
//!   equal by content.
//! - `Hash` and `Borrow<str>` are coherent with `str`, so maps keyed by `Key`
//!   can be probed with a plain `&str` without interning first.
//!
//! The interner is append-only. Key names come from program text, so the set
//! of distinct names is bounded; nothing is ever evicted.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

static INTERNER: Lazy<RwLock<FxHashSet<Arc<str>>>> =
    Lazy::new(|| RwLock::new(FxHashSet::default()));

/// An interned record field label.
///
/// Cheap to clone (one atomic increment) and cheap to compare (pointer check
/// first, content comparison only between different allocations).
///
/// # Examples
///
/// ```
/// use tanager_collections::Key;
///
/// let a = Key::intern("age");
/// let b = Key::intern("age");
/// assert!(a.ptr_eq(&b));
/// assert_eq!(a.as_str(), "age");
/// ```
#[derive(Debug, Clone)]
pub struct Key(Arc<str>);

impl Key {
    /// Intern `name`, returning the canonical `Key` for it.
    ///
    /// The first call for a given name allocates; every later call returns a
    /// handle to the same allocation.
    pub fn intern(name: &str) -> Key {
        {
            let set = INTERNER.read();
            if let Some(existing) = set.get(name) {
                return Key(existing.clone());
            }
        }
        let mut set = INTERNER.write();
        // Re-check: another thread may have interned between the locks.
        if let Some(existing) = set.get(name) {
            return Key(existing.clone());
        }
        let canonical: Arc<str> = Arc::from(name);
        set.insert(canonical.clone());
        Key(canonical)
    }

    /// The key's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether two keys share the same allocation.
    ///
    /// True for any two keys produced by [`Key::intern`] from equal strings.
    pub fn ptr_eq(&self, other: &Key) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Key) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl Eq for Key {}

// Coherent with `Borrow<str>`: a Key hashes exactly like its name.
impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Key {
        Key::intern(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Key {
        Key::intern(&name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn test_intern_is_canonical() {
        let a = Key::intern("canonical-key");
        let b = Key::intern("canonical-key");
        assert!(a.ptr_eq(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_names_differ() {
        let a = Key::intern("left");
        let b = Key::intern("right");
        assert!(!a.ptr_eq(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_shares_allocation() {
        let a = Key::intern("shared");
        let b = a.clone();
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn test_map_probe_by_str() {
        let mut map: FxHashMap<Key, i32> = FxHashMap::default();
        map.insert(Key::intern("count"), 7);
        // Borrow<str> lets lookups skip the interner entirely.
        assert_eq!(map.get("count"), Some(&7));
        assert_eq!(map.get("absent"), None);
    }

    #[test]
    fn test_display_is_bare_name() {
        let key = Key::intern("name");
        assert_eq!(key.to_string(), "name");
        assert_eq!(format!("{key}"), "name");
    }

    #[test]
    fn test_empty_and_unicode_names() {
        let empty = Key::intern("");
        assert_eq!(empty.as_str(), "");
        let unicode = Key::intern("日本語");
        assert_eq!(unicode.as_str(), "日本語");
        assert!(unicode.ptr_eq(&Key::intern("日本語")));
    }

    #[test]
    fn test_concurrent_interning_converges() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..64)
                        .map(|i| Key::intern(&format!("racing-{}", i % 4)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let batches: Vec<Vec<Key>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let reference = &batches[0];
        for batch in &batches[1..] {
            for (a, b) in reference.iter().zip(batch) {
                assert!(a.ptr_eq(b));
            }
        }
    }
}
