//! Declaration metadata registry for the Tanager runtime
//!
//! Compiled modules carry user annotations on their top-level declarations.
//! At program load each module's generated initializer registers those
//! annotations here; tooling (the doc generator, the REPL, deriving macros)
//! then queries them by module, by declaration, or by tag.
//!
//! The registry is an explicit object, not ambient state: whoever loads
//! modules owns a [`MetadataRegistry`] and passes it by reference. Dropping
//! it is the teardown.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod metadata;

// Re-export commonly used types
pub use metadata::{DeclAccessor, MetadataRegistry, TaggedDecl};
