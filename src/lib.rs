//! Tanager runtime - value structures and metadata for compiled programs
//!
//! This crate bundles the runtime support a compiled Tanager program links
//! against: the persistent record store every program value flows through,
//! and the metadata registry module initializers publish annotations to.
//!
//! # Quick Start
//!
//! ```
//! use tanager_runtime::{Record, Value};
//!
//! let base = Record::new()
//!     .assoc("host", Value::from("localhost"))
//!     .assoc("port", Value::Int(8080));
//!
//! // Updates produce new versions; `base` is untouched.
//! let patched = base.assoc("port", Value::Int(9090));
//! assert_eq!(patched["port"], Value::Int(9090));
//! assert_eq!(base["port"], Value::Int(8080));
//!
//! // Dropping the override exposes the shadowed value again.
//! let reverted = patched.dissoc("port");
//! assert_eq!(reverted, base);
//! ```
//!
//! # Architecture
//!
//! Two member crates make up the runtime:
//!
//! - `tanager-collections`: [`Record`] and [`LinearRecord`], their
//!   [`ValueChain`] field history, the [`Value`] model, interned [`Key`]s,
//!   and the [`Atom`] shared cell.
//! - `tanager-registry`: [`MetadataRegistry`], where generated module
//!   initializers publish annotation metadata for tooling to query.

// Re-export the public API of both runtime crates
pub use tanager_collections::*;
pub use tanager_registry::*;
