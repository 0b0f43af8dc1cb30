//! hedl-traverse - The read-only Traversal API.
//!
//! External renderers (`hedl-render`) and the FFI control surface
//! (`hedl-ffi`) reach a resolved [`Document`] exclusively through this
//! crate; neither touches `Document`'s internal storage directly. Every
//! handle here borrows from the document and cannot outlive it -- the
//! lifetime parameter `'a` threaded through every type enforces that at
//! compile time rather than by convention.
//!
//! [`ValueHandle::visit`] follows the shape of `serde::Serializer`: a
//! visitor supplies one method per [`ValueKind`] variant and the handle
//! dispatches to it, rather than exposing the variant for a `match` the
//! caller could get wrong by omission.

use hedl_model::{
    AliasId, Document, FieldDecl, ListValue, Reference, ReferenceTarget, RootItemId, SchemaId, Value, ValueKind,
};
use hedl_util::Symbol;

/// Borrowed entry point over a resolved document.
#[derive(Clone, Copy)]
pub struct DocumentView<'a> {
    doc: &'a Document,
}

impl<'a> DocumentView<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }

    pub fn version(&self) -> (u32, u32) {
        (self.doc.major, self.doc.minor)
    }

    pub fn schema_count(&self) -> usize {
        self.doc.schema_count()
    }

    pub fn alias_count(&self) -> usize {
        self.doc.alias_count()
    }

    pub fn root_item_count(&self) -> usize {
        self.doc.root_item_count()
    }

    pub fn schemas(&self) -> impl Iterator<Item = SchemaHandle<'a>> + 'a {
        let doc = self.doc;
        doc.schemas.indices().map(move |id| SchemaHandle { doc, id })
    }

    pub fn aliases(&self) -> impl Iterator<Item = AliasHandle<'a>> + 'a {
        let doc = self.doc;
        doc.aliases.indices().map(move |id| AliasHandle { doc, id })
    }

    pub fn root_items(&self) -> impl Iterator<Item = RootItemHandle<'a>> + 'a {
        let doc = self.doc;
        doc.root_items.indices().map(move |id| RootItemHandle { doc, id })
    }

    pub fn schema_by_name(&self, name: &str) -> Option<SchemaHandle<'a>> {
        let sym = self.doc.interner.lookup(name)?;
        self.doc.schema_by_name(sym).map(|id| SchemaHandle { doc: self.doc, id })
    }

    pub fn diagnostics(&self) -> &'a [hedl_util::Diagnostic] {
        &self.doc.diagnostics
    }
}

#[derive(Clone, Copy)]
pub struct SchemaHandle<'a> {
    doc: &'a Document,
    id: SchemaId,
}

impl<'a> SchemaHandle<'a> {
    pub fn name(&self) -> &'a str {
        self.doc.interner.resolve(self.doc.schemas[self.id].name)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldHandle<'a>> + 'a {
        let doc = self.doc;
        self.doc.schemas[self.id].fields.iter().map(move |decl| FieldHandle { doc, decl })
    }

    pub fn field_count(&self) -> usize {
        self.doc.schemas[self.id].fields.len()
    }
}

#[derive(Clone, Copy)]
pub struct FieldHandle<'a> {
    doc: &'a Document,
    decl: &'a FieldDecl,
}

impl<'a> FieldHandle<'a> {
    pub fn name(&self) -> &'a str {
        self.doc.interner.resolve(self.decl.name)
    }

    pub fn optional(&self) -> bool {
        self.decl.optional
    }

    pub fn default(&self) -> Option<ValueHandle<'a>> {
        self.decl.default.as_ref().map(|v| ValueHandle { doc: self.doc, value: v })
    }
}

#[derive(Clone, Copy)]
pub struct AliasHandle<'a> {
    doc: &'a Document,
    id: AliasId,
}

impl<'a> AliasHandle<'a> {
    pub fn name(&self) -> &'a str {
        self.doc.interner.resolve(self.doc.aliases[self.id].name)
    }

    pub fn value(&self) -> ValueHandle<'a> {
        ValueHandle { doc: self.doc, value: &self.doc.aliases[self.id].value }
    }
}

#[derive(Clone, Copy)]
pub struct RootItemHandle<'a> {
    doc: &'a Document,
    id: RootItemId,
}

impl<'a> RootItemHandle<'a> {
    pub fn key(&self) -> &'a str {
        self.doc.interner.resolve(self.doc.root_items[self.id].key)
    }

    pub fn value(&self) -> ValueHandle<'a> {
        ValueHandle { doc: self.doc, value: &self.doc.root_items[self.id].value }
    }
}

/// A borrowed [`Value`] together with the document needed to resolve its
/// symbols and nested handles.
#[derive(Clone, Copy)]
pub struct ValueHandle<'a> {
    doc: &'a Document,
    value: &'a Value,
}

impl<'a> ValueHandle<'a> {
    /// Dispatch to exactly one method of `visitor` for this value's kind.
    pub fn visit<V: Visitor<'a>>(&self, visitor: &mut V) -> V::Output {
        match &self.value.kind {
            ValueKind::Null => visitor.visit_null(),
            ValueKind::Bool(b) => visitor.visit_bool(*b),
            ValueKind::Integer(i) => visitor.visit_integer(*i),
            ValueKind::Float(f) => visitor.visit_float(*f),
            ValueKind::String(sym) => visitor.visit_string(self.doc.interner.resolve(*sym)),
            ValueKind::Reference(r) => visitor.visit_reference(ReferenceHandle { doc: self.doc, reference: r }),
            ValueKind::List(ListValue::Flat(items)) => {
                let doc = self.doc;
                visitor.visit_flat_list(ListHandle {
                    len: items.len(),
                    iter: Box::new(items.iter().map(move |v| ValueHandle { doc, value: v })),
                })
            }
            ValueKind::List(ListValue::Matrix { schema, rows }) => {
                let doc = self.doc;
                visitor.visit_matrix_list(MatrixHandle {
                    schema: SchemaHandle { doc, id: *schema },
                    rows: rows.iter().map(move |row| RecordFieldsHandle { doc, fields: row }).collect(),
                })
            }
            ValueKind::Map(map) => {
                let doc = self.doc;
                visitor.visit_map(MapHandle {
                    len: map.len(),
                    iter: Box::new(map.iter().map(move |(k, v)| (doc.interner.resolve(*k), ValueHandle { doc, value: v }))),
                })
            }
            ValueKind::Record { schema, fields } => visitor.visit_record(RecordHandle {
                schema: SchemaHandle { doc: self.doc, id: *schema },
                fields: RecordFieldsHandle { doc: self.doc, fields },
            }),
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

/// One callback per [`ValueKind`] variant; a visitor implements every
/// method and `visit` dispatches to the matching one.
pub trait Visitor<'a> {
    type Output;

    fn visit_null(&mut self) -> Self::Output;
    fn visit_bool(&mut self, value: bool) -> Self::Output;
    fn visit_integer(&mut self, value: i64) -> Self::Output;
    fn visit_float(&mut self, value: f64) -> Self::Output;
    fn visit_string(&mut self, value: &'a str) -> Self::Output;
    fn visit_reference(&mut self, reference: ReferenceHandle<'a>) -> Self::Output;
    fn visit_flat_list(&mut self, list: ListHandle<'a>) -> Self::Output;
    fn visit_matrix_list(&mut self, matrix: MatrixHandle<'a>) -> Self::Output;
    fn visit_map(&mut self, map: MapHandle<'a>) -> Self::Output;
    fn visit_record(&mut self, record: RecordHandle<'a>) -> Self::Output;
}

#[derive(Clone, Copy)]
pub struct ReferenceHandle<'a> {
    doc: &'a Document,
    reference: &'a Reference,
}

impl<'a> ReferenceHandle<'a> {
    /// The dotted path exactly as written, e.g. `prod` or `schema.field`.
    pub fn path(&self) -> &'a str {
        self.doc.interner.resolve(self.reference.path)
    }

    /// `None` for a reference left dangling by lenient-mode resolution.
    pub fn target(&self) -> Option<ResolvedTarget<'a>> {
        match self.reference.target {
            Some(ReferenceTarget::Alias(id)) => Some(ResolvedTarget::Alias(AliasHandle { doc: self.doc, id })),
            Some(ReferenceTarget::Schema(id)) => Some(ResolvedTarget::Schema(SchemaHandle { doc: self.doc, id })),
            Some(ReferenceTarget::SchemaField(id, index)) => {
                let decl = &self.doc.schemas[id].fields[index];
                Some(ResolvedTarget::SchemaField(SchemaHandle { doc: self.doc, id }, FieldHandle { doc: self.doc, decl }))
            }
            None => None,
        }
    }
}

pub enum ResolvedTarget<'a> {
    Alias(AliasHandle<'a>),
    Schema(SchemaHandle<'a>),
    SchemaField(SchemaHandle<'a>, FieldHandle<'a>),
}

/// A lazy ordered sequence of [`ValueHandle`]s.
pub struct ListHandle<'a> {
    len: usize,
    iter: Box<dyn Iterator<Item = ValueHandle<'a>> + 'a>,
}

impl<'a> ListHandle<'a> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<'a> Iterator for ListHandle<'a> {
    type Item = ValueHandle<'a>;
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

pub struct MapHandle<'a> {
    len: usize,
    iter: Box<dyn Iterator<Item = (&'a str, ValueHandle<'a>)> + 'a>,
}

impl<'a> MapHandle<'a> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<'a> Iterator for MapHandle<'a> {
    type Item = (&'a str, ValueHandle<'a>);
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// The `(field name, value)` pairs of one record or matrix row, in schema
/// declaration order (the order `hedl_sem` lays resolved record fields out
/// in).
pub struct RecordFieldsHandle<'a> {
    doc: &'a Document,
    fields: &'a indexmap::IndexMap<Symbol, Value>,
}

impl<'a> RecordFieldsHandle<'a> {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, ValueHandle<'a>)> + 'a {
        let doc = self.doc;
        self.fields.iter().map(move |(k, v)| (doc.interner.resolve(*k), ValueHandle { doc, value: v }))
    }

    pub fn get(&self, name: &str) -> Option<ValueHandle<'a>> {
        self.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
    }
}

pub struct RecordHandle<'a> {
    pub schema: SchemaHandle<'a>,
    pub fields: RecordFieldsHandle<'a>,
}

pub struct MatrixHandle<'a> {
    pub schema: SchemaHandle<'a>,
    pub rows: Vec<RecordFieldsHandle<'a>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedl_lex::Lexer;
    use hedl_par::Parser;
    use hedl_sem::resolve;
    use hedl_util::{symbol::Interner, FileId};

    fn parse_doc(src: &str) -> Document {
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, FileId::DUMMY, &mut interner).tokenize().unwrap();
        let ast = Parser::new(tokens, src, &interner).parse().unwrap();
        resolve(ast, interner, true).unwrap()
    }

    #[derive(Default)]
    struct Counts {
        strings: usize,
        integers: usize,
        records: usize,
    }

    impl<'a> Visitor<'a> for Counts {
        type Output = ();
        fn visit_null(&mut self) {}
        fn visit_bool(&mut self, _: bool) {}
        fn visit_integer(&mut self, _: i64) {
            self.integers += 1;
        }
        fn visit_float(&mut self, _: f64) {}
        fn visit_string(&mut self, _: &'a str) {
            self.strings += 1;
        }
        fn visit_reference(&mut self, _: ReferenceHandle<'a>) {}
        fn visit_flat_list(&mut self, list: ListHandle<'a>) {
            for item in list {
                item.visit(self);
            }
        }
        fn visit_matrix_list(&mut self, matrix: MatrixHandle<'a>) {
            self.records += matrix.rows.len();
        }
        fn visit_map(&mut self, map: MapHandle<'a>) {
            for (_, v) in map {
                v.visit(self);
            }
        }
        fn visit_record(&mut self, _: RecordHandle<'a>) {
            self.records += 1;
        }
    }

    #[test]
    fn version_and_counts_match_document() {
        let doc = parse_doc("%VERSION: 1.0\n---\nname: Alice\nage: 30\n");
        let view = DocumentView::new(&doc);
        assert_eq!(view.version(), (1, 0));
        assert_eq!(view.root_item_count(), 2);
    }

    #[test]
    fn visitor_walks_nested_structure() {
        let doc = parse_doc(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrows: [Row { a: 1 }, Row { a: 2 }]\nname: \"x\"\n",
        );
        let view = DocumentView::new(&doc);
        let mut counts = Counts::default();
        for item in view.root_items() {
            item.value().visit(&mut counts);
        }
        assert_eq!(counts.records, 2);
        assert_eq!(counts.strings, 1);
    }

    #[test]
    fn reference_target_resolves_to_an_alias_handle() {
        let doc = parse_doc("%VERSION: 1.0\n%ALIAS: prod = production\n---\nenvironment: @prod\n");
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        let mut found_alias = false;
        item.value().visit(&mut ReferenceChecker(&mut found_alias));
        assert!(found_alias);
    }

    struct ReferenceChecker<'b>(&'b mut bool);
    impl<'a, 'b> Visitor<'a> for ReferenceChecker<'b> {
        type Output = ();
        fn visit_null(&mut self) {}
        fn visit_bool(&mut self, _: bool) {}
        fn visit_integer(&mut self, _: i64) {}
        fn visit_float(&mut self, _: f64) {}
        fn visit_string(&mut self, _: &'a str) {}
        fn visit_reference(&mut self, reference: ReferenceHandle<'a>) {
            if let Some(ResolvedTarget::Alias(alias)) = reference.target() {
                if alias.name() == "prod" {
                    *self.0 = true;
                }
            }
        }
        fn visit_flat_list(&mut self, _: ListHandle<'a>) {}
        fn visit_matrix_list(&mut self, _: MatrixHandle<'a>) {}
        fn visit_map(&mut self, _: MapHandle<'a>) {}
        fn visit_record(&mut self, _: RecordHandle<'a>) {}
    }
}
