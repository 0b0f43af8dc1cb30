//! hedl-model - The resolved HEDL document model.
//!
//! The parser ([`hedl_par`](../hedl_par/index.html)) builds an unresolved
//! syntax tree from its own `ast` module; the resolver
//! ([`hedl_sem`](../hedl_sem/index.html)) lowers that tree into the
//! [`Document`] this crate defines. Everything downstream -- the
//! canonicalizer, linter, traversal API and renderers -- reads only this
//! model, never the parser's AST.

pub mod document;
pub mod ids;
pub mod schema;
pub mod value;

pub use document::{Document, RootItem};
pub use ids::{AliasId, NodeId, NodeIdGen, RootItemId, SchemaId};
pub use schema::{Alias, FieldDecl, FieldType, Schema};
pub use value::{ListValue, Reference, ReferenceTarget, Value, ValueKind};
