//! The [`Document`]: the finalized, resolved representation.

use crate::ids::{AliasId, NodeId, RootItemId, SchemaId};
use crate::schema::{Alias, Schema};
use crate::value::Value;
use hedl_util::diagnostic::Diagnostic;
use hedl_util::symbol::Interner;
use hedl_util::{FxHashMap, IndexVec, Span, Symbol};

#[derive(Clone, Debug)]
pub struct RootItem {
    pub key: Symbol,
    pub value: Value,
    pub span: Span,
}

/// The resolved document: schemas, aliases and root items, addressable both
/// by name (hash index) and by ordinal (dense index), plus the out-of-band
/// span side table and the accumulated diagnostic buffer.
///
/// Created by the parser, finalized by the resolver; immutable thereafter.
/// The document owns the string interner so that every
/// [`Symbol`] produced while building it stays resolvable for its lifetime.
pub struct Document {
    pub major: u32,
    pub minor: u32,

    pub schemas: IndexVec<SchemaId, Schema>,
    schema_index: FxHashMap<Symbol, SchemaId>,

    pub aliases: IndexVec<AliasId, Alias>,
    alias_index: FxHashMap<Symbol, AliasId>,

    pub root_items: IndexVec<RootItemId, RootItem>,
    root_index: FxHashMap<Symbol, RootItemId>,

    spans: FxHashMap<NodeId, Span>,

    pub diagnostics: Vec<Diagnostic>,

    pub interner: Interner,
}

impl Document {
    pub fn new(major: u32, minor: u32, interner: Interner) -> Self {
        Self {
            major,
            minor,
            schemas: IndexVec::new(),
            schema_index: FxHashMap::default(),
            aliases: IndexVec::new(),
            alias_index: FxHashMap::default(),
            root_items: IndexVec::new(),
            root_index: FxHashMap::default(),
            spans: FxHashMap::default(),
            diagnostics: Vec::new(),
            interner,
        }
    }

    pub fn push_schema(&mut self, schema: Schema) -> SchemaId {
        let name = schema.name;
        let id = self.schemas.push(schema);
        self.schema_index.insert(name, id);
        id
    }

    pub fn push_alias(&mut self, alias: Alias) -> AliasId {
        let name = alias.name;
        let id = self.aliases.push(alias);
        self.alias_index.insert(name, id);
        id
    }

    pub fn push_root_item(&mut self, item: RootItem) -> RootItemId {
        let key = item.key;
        let id = self.root_items.push(item);
        self.root_index.insert(key, id);
        id
    }

    pub fn schema_by_name(&self, name: Symbol) -> Option<SchemaId> {
        self.schema_index.get(&name).copied()
    }

    pub fn alias_by_name(&self, name: Symbol) -> Option<AliasId> {
        self.alias_index.get(&name).copied()
    }

    pub fn root_item_by_key(&self, key: Symbol) -> Option<RootItemId> {
        self.root_index.get(&key).copied()
    }

    pub fn record_span(&mut self, id: NodeId, span: Span) {
        self.spans.insert(id, span);
    }

    pub fn span_of(&self, id: NodeId) -> Span {
        self.spans.get(&id).copied().unwrap_or(Span::DUMMY)
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub fn root_item_count(&self) -> usize {
        self.root_items.len()
    }

    pub fn has_errors(&self) -> bool {
        use hedl_util::diagnostic::Severity;
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}
