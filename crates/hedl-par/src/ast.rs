//! The unresolved syntax tree the parser builds.
//!
//! Distinct from [`hedl_model::Document`]: names referring to schemas and
//! aliases are still bare [`Symbol`]s here, and `Reference`s carry only the
//! dotted path text. The resolver ([`hedl_sem`](../hedl_sem/index.html))
//! lowers one of these into a `Document`, replacing names with ordinals as
//! it goes.

use hedl_model::NodeId;
use hedl_util::{Span, Symbol};

#[derive(Clone, Debug)]
pub struct Ast {
    pub version: Option<VersionDecl>,
    pub schemas: Vec<SchemaDecl>,
    pub aliases: Vec<AliasDecl>,
    pub body: Vec<RootEntry>,
}

#[derive(Clone, Copy, Debug)]
pub struct VersionDecl {
    pub major: u32,
    pub minor: u32,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct AliasDecl {
    pub name: Symbol,
    pub value: RawValue,
    pub span: Span,
}

/// A field's declared type, by name -- `Schema(sym)` is resolved against the
/// schema table by the resolver's declaration pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawType {
    Bool,
    Integer,
    Float,
    String,
    Reference,
    Schema(Symbol),
}

#[derive(Clone, Debug)]
pub struct RawFieldDecl {
    pub name: Symbol,
    pub ty: RawType,
    pub optional: bool,
    pub default: Option<RawValue>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct SchemaDecl {
    pub name: Symbol,
    pub fields: Vec<RawFieldDecl>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct RootEntry {
    pub key: Symbol,
    pub value: RawValue,
    pub span: Span,
}

/// A list as the parser classified it: matrix when every element
/// is a record sharing one schema and field ordering, flat otherwise. The
/// resolver rechecks this classification once schemas are bound.
#[derive(Clone, Debug)]
pub enum RawList {
    Flat(Vec<RawValue>),
    Matrix(Vec<Vec<(Symbol, RawValue)>>, Symbol),
}

#[derive(Clone, Debug)]
pub enum RawValueKind {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(Symbol),
    Reference(Symbol),
    List(RawList),
    Map(Vec<(Symbol, RawValue)>),
    Record { schema: Symbol, fields: Vec<(Symbol, RawValue)> },
}

#[derive(Clone, Debug)]
pub struct RawValue {
    pub kind: RawValueKind,
    pub span: Span,
    pub id: NodeId,
}
