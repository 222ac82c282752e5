//! Core value structures for the Tanager runtime
//!
//! This crate defines the data model compiled Tanager programs run on:
//! - Key: Interned record field label
//! - Value: Unified value enum for all runtime data
//! - ValueChain: Per-key stack holding a record field's shadowed history
//! - OrderedMap: Insertion-ordered persistent map the record store builds on
//! - Record / LinearRecord: Duplicate-key record store, persistent and
//!   single-owner construction forms
//! - Atom: Shared mutable cell over immutable values
//! - Error: Error type for checked accessors

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod atom;
pub mod chain;
pub mod error;
pub mod key;
pub mod map;
pub mod record;
pub mod value;

// Re-export commonly used types
pub use atom::Atom;
pub use chain::ValueChain;
pub use error::{Error, Result};
pub use key::Key;
pub use map::OrderedMap;
pub use record::{LinearRecord, Record};
pub use value::Value;
