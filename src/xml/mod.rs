//! Minimal XML support for the mapping engine: an owned element tree,
//! scoped path queries with fixed prefix bindings, and indent serialization.
//!
//! The engine needs exactly four capabilities from its XML layer — parse,
//! query, build, serialize — and this module provides them over
//! [`quick_xml`] events, keeping source trees immutable throughout a
//! conversion.

mod query;
mod tree;
mod writer;

pub use query::Scope;
pub use tree::{Document, Element};
pub use writer::{XmlWriter, write_document};
