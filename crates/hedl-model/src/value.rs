//! The resolved [`Value`] sum type.

use crate::ids::{AliasId, NodeId, SchemaId};
use hedl_util::Symbol;
use indexmap::IndexMap;

/// Where a resolved [`Reference`] points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceTarget {
    Alias(AliasId),
    /// A bare `@SchemaName` with no dotted field part.
    Schema(SchemaId),
    SchemaField(SchemaId, usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    /// The dotted path text as written, e.g. `schema.field` or `name`.
    pub path: Symbol,
    /// `None` until the resolver's reference pass runs; remains `None` in
    /// lenient mode when the target could not be found.
    pub target: Option<ReferenceTarget>,
}

/// Either a flat ordered list, or a matrix of records sharing a schema.
#[derive(Clone, Debug, PartialEq)]
pub enum ListValue {
    Flat(Vec<Value>),
    Matrix { schema: SchemaId, rows: Vec<IndexMap<Symbol, Value>> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(Symbol),
    Reference(Reference),
    List(ListValue),
    Map(IndexMap<Symbol, Value>),
    Record { schema: SchemaId, fields: IndexMap<Symbol, Value> },
}

/// A value together with the id used to look its [`hedl_util::Span`] up in
/// the document's span side table, kept separate so the in-memory Value
/// stays compact.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    pub kind: ValueKind,
    pub id: NodeId,
}

impl Value {
    pub fn new(kind: ValueKind, id: NodeId) -> Self {
        Self { kind, id }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }
}
