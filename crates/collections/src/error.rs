//! Error types for the collections crate
//!
//! This module defines the errors produced by checked accessors. We use
//! `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Only fallible *lookups* surface here. Contract violations (indexing a
//! missing key, positional access past the end) panic instead, matching the
//! standard library's map and slice indexing.

use crate::key::Key;
use thiserror::Error;

/// Result type alias for collection operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for record and chain accessors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Key not present in the record
    #[error("missing key: {0}")]
    MissingKey(Key),

    /// Positional access past the end of a record or chain
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        /// Requested position
        index: usize,
        /// Number of entries actually present
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_key() {
        let err = Error::MissingKey(Key::intern("age"));
        let msg = err.to_string();
        assert!(msg.contains("missing key"));
        assert!(msg.contains("age"));
    }

    #[test]
    fn test_error_display_index_out_of_bounds() {
        let err = Error::IndexOutOfBounds { index: 7, len: 3 };
        let msg = err.to_string();
        assert!(msg.contains("index 7"));
        assert!(msg.contains("len 3"));
    }

    #[test]
    fn test_error_is_cloneable_and_comparable() {
        let err = Error::MissingKey(Key::intern("x"));
        assert_eq!(err.clone(), err);
    }
}
