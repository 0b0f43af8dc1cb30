//! hedl-sem - The Resolver.
//!
//! Lowers an unresolved [`hedl_par::ast::Ast`] into a finalized
//! [`hedl_model::Document`] in three passes: declaration (schema/alias name
//! collisions, field uniqueness), alias (topological evaluation with cycle
//! detection), and reference & type (binds every `@reference`, type-checks
//! every record against its schema, fills optional fields with declared
//! defaults).
//!
//! Only reference resolution differs between strict and lenient mode:
//! duplicate names, alias cycles and type-check failures are hard
//! failures regardless of `strict`.

pub mod error;

use error::{ResolveError, ResolveResult};
use hedl_model::{
    Alias, Document, FieldDecl, FieldType, ListValue, Reference, ReferenceTarget, RootItem,
    Schema, SchemaId, Value, ValueKind,
};
use hedl_par::ast::{AliasDecl, Ast, RawList, RawType, RawValue, RawValueKind};
use hedl_util::diagnostic::{codes, Diagnostic};
use hedl_util::symbol::Interner;
use hedl_util::{FxHashMap, Idx, Span, Symbol};
use indexmap::IndexMap;

/// Runs all three resolver passes, returning the finalized document or the
/// first hard failure encountered. `strict` governs only reference
/// resolution; every other check is a hard failure in both modes.
pub fn resolve(ast: Ast, interner: Interner, strict: bool) -> ResolveResult<Document> {
    let (major, minor, minor_warning) = resolve_version(&ast)?;
    let mut doc = Document::new(major, minor, interner);
    if let Some(w) = minor_warning {
        doc.diagnostics.push(w);
    }

    let mut global_names: FxHashMap<Symbol, Span> = FxHashMap::default();

    // --- pass 1: declarations ------------------------------------------
    let schema_order = declare_schemas(&ast, &mut doc, &mut global_names)?;
    populate_schema_fields(&ast, &mut doc, &schema_order)?;

    // --- pass 2: aliases (topological evaluation, cycle detection) -----
    resolve_aliases(&ast.aliases, &mut doc, strict, &mut global_names)?;

    // field defaults may reference aliases, so they are lowered only once
    // the alias table is complete.
    lower_schema_defaults(&ast, &mut doc, &schema_order, strict)?;

    // --- pass 3: reference & type pass over the body --------------------
    for entry in &ast.body {
        declare_name(&doc, &mut global_names, entry.key, entry.span)?;
        let value = lower_value(&mut doc, &entry.value, strict)?;
        doc.push_root_item(RootItem { key: entry.key, value, span: entry.span });
    }

    Ok(doc)
}

/// Convenience wrapper matching `hedl_par::Parser::parse_lenient`'s shape.
pub fn resolve_lenient(ast: Ast, interner: Interner) -> ResolveResult<Document> {
    resolve(ast, interner, false)
}

// ---------------------------------------------------------------------
// version
// ---------------------------------------------------------------------

/// The only major version this engine understands. An unknown major
/// version is a resolver-stage error; an unknown minor version is accepted
/// with a warning diagnostic.
const SUPPORTED_MAJOR_VERSION: u32 = 1;

/// A document with no `%VERSION` directive defaults to `1.0` (Open
/// Question, decided in DESIGN.md): the grammar treats the prologue as
/// entirely optional, and `1.0` is the only version this engine emits.
fn resolve_version(ast: &Ast) -> ResolveResult<(u32, u32, Option<Diagnostic>)> {
    match ast.version {
        Some(decl) => {
            if decl.major != SUPPORTED_MAJOR_VERSION {
                return Err(ResolveError::UnknownMajorVersion { major: decl.major, span: decl.span });
            }
            let warning = if decl.minor != 0 {
                Some(Diagnostic::new(
                    codes::W_UNKNOWN_MINOR_VERSION,
                    format!("minor version {} is not recognized; proceeding as best-effort", decl.minor),
                    decl.span,
                ))
            } else {
                None
            };
            Ok((decl.major, decl.minor, warning))
        }
        None => Ok((1, 0, None)),
    }
}

// ---------------------------------------------------------------------
// pass 1: declarations
// ---------------------------------------------------------------------

/// Records `name` as seen at `span` in the document-wide name table.
/// Schema names, alias names and root keys share one namespace.
fn declare_name(
    doc: &Document,
    global_names: &mut FxHashMap<Symbol, Span>,
    name: Symbol,
    span: Span,
) -> ResolveResult<()> {
    if let Some(&first) = global_names.get(&name) {
        return Err(ResolveError::DuplicateName {
            name: doc.interner.resolve(name).to_string(),
            span,
            first,
        });
    }
    global_names.insert(name, span);
    Ok(())
}

fn declare_schemas(
    ast: &Ast,
    doc: &mut Document,
    global_names: &mut FxHashMap<Symbol, Span>,
) -> ResolveResult<Vec<SchemaId>> {
    let mut order = Vec::with_capacity(ast.schemas.len());
    for decl in &ast.schemas {
        declare_name(doc, global_names, decl.name, decl.span)?;
        let id = doc.push_schema(Schema { name: decl.name, fields: Vec::new(), span: decl.span });
        order.push(id);
    }
    Ok(order)
}

/// Populates field declarations once every schema name is known, so a
/// field may reference a schema declared later in the prologue.
fn populate_schema_fields(ast: &Ast, doc: &mut Document, order: &[SchemaId]) -> ResolveResult<()> {
    for (decl, &id) in ast.schemas.iter().zip(order) {
        let mut field_spans: FxHashMap<Symbol, Span> = FxHashMap::default();
        let mut fields = Vec::with_capacity(decl.fields.len());
        for f in &decl.fields {
            if let Some(&first) = field_spans.get(&f.name) {
                return Err(ResolveError::DuplicateField {
                    schema: doc.interner.resolve(decl.name).to_string(),
                    field: doc.interner.resolve(f.name).to_string(),
                    span: f.span,
                    first,
                });
            }
            field_spans.insert(f.name, f.span);
            let ty = resolve_field_type(doc, f.ty, f.span)?;
            fields.push(FieldDecl { name: f.name, ty, optional: f.optional, default: None, span: f.span });
        }
        doc.schemas[id].fields = fields;
    }
    Ok(())
}

fn resolve_field_type(doc: &Document, ty: RawType, span: Span) -> ResolveResult<FieldType> {
    Ok(match ty {
        RawType::Bool => FieldType::Bool,
        RawType::Integer => FieldType::Integer,
        RawType::Float => FieldType::Float,
        RawType::String => FieldType::String,
        RawType::Reference => FieldType::Reference,
        RawType::Schema(sym) => {
            let id = doc.schema_by_name(sym).ok_or_else(|| ResolveError::UnresolvedReference {
                path: doc.interner.resolve(sym).to_string(),
                span,
            })?;
            FieldType::Schema(id)
        }
    })
}

/// Lowers every optional field's default once the alias table exists
/// (defaults may contain `@alias` references -- Open Question, decided in
/// DESIGN.md). A field with no written default gets a single synthesized
/// `Null`, so downstream consumers never special-case "optional, no
/// default".
fn lower_schema_defaults(
    ast: &Ast,
    doc: &mut Document,
    order: &[SchemaId],
    strict: bool,
) -> ResolveResult<()> {
    let mut synth = hedl_model::NodeIdGen::starting_at(max_node_id(ast) + 1);
    for (decl, &id) in ast.schemas.iter().zip(order) {
        for (i, f) in decl.fields.iter().enumerate() {
            if !f.optional {
                continue;
            }
            let default = match &f.default {
                Some(raw) => lower_value(doc, raw, strict)?,
                None => Value::new(ValueKind::Null, synth.next()),
            };
            doc.schemas[id].fields[i].default = Some(default);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------
// pass 2: aliases
// ---------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

fn resolve_aliases(
    decls: &[AliasDecl],
    doc: &mut Document,
    strict: bool,
    global_names: &mut FxHashMap<Symbol, Span>,
) -> ResolveResult<()> {
    let mut name_to_idx: FxHashMap<Symbol, usize> = FxHashMap::default();
    for (i, decl) in decls.iter().enumerate() {
        declare_name(doc, global_names, decl.name, decl.span)?;
        name_to_idx.insert(decl.name, i);
    }

    let mut marks = vec![Mark::Unvisited; decls.len()];
    let mut stack: Vec<Symbol> = Vec::new();
    for i in 0..decls.len() {
        if doc.alias_by_name(decls[i].name).is_none() {
            resolve_one_alias(i, decls, &name_to_idx, &mut marks, doc, strict, &mut stack)?;
        }
    }
    Ok(())
}

fn resolve_one_alias(
    idx: usize,
    decls: &[AliasDecl],
    name_to_idx: &FxHashMap<Symbol, usize>,
    marks: &mut [Mark],
    doc: &mut Document,
    strict: bool,
    stack: &mut Vec<Symbol>,
) -> ResolveResult<hedl_model::AliasId> {
    if let Some(id) = doc.alias_by_name(decls[idx].name) {
        return Ok(id);
    }
    match marks[idx] {
        Mark::InProgress => {
            let mut path: Vec<String> = stack.iter().map(|s| doc.interner.resolve(*s).to_string()).collect();
            path.push(doc.interner.resolve(decls[idx].name).to_string());
            return Err(ResolveError::AliasCycle { path, span: decls[idx].span });
        }
        Mark::Done => unreachable!("alias already pushed into the document"),
        Mark::Unvisited => {}
    }
    marks[idx] = Mark::InProgress;
    stack.push(decls[idx].name);

    let raw = decls[idx].value.clone();
    let value = lower_alias_rhs(&raw, decls, name_to_idx, marks, doc, strict, stack)?;

    stack.pop();
    marks[idx] = Mark::Done;
    let span = decls[idx].span;
    Ok(doc.push_alias(Alias { name: decls[idx].name, value, span }))
}

/// An alias's right-hand side is either a scalar, or a reference -- to
/// another alias (chased and flattened so `alias.value` is always a
/// terminal value), or to a schema/field path (left as a `Reference`,
/// since there is no scalar behind a schema to substitute).
fn lower_alias_rhs(
    raw: &RawValue,
    decls: &[AliasDecl],
    name_to_idx: &FxHashMap<Symbol, usize>,
    marks: &mut [Mark],
    doc: &mut Document,
    strict: bool,
    stack: &mut Vec<Symbol>,
) -> ResolveResult<Value> {
    match &raw.kind {
        RawValueKind::Null | RawValueKind::Bool(_) | RawValueKind::Integer(_) | RawValueKind::Float(_)
        | RawValueKind::String(_) => {
            doc.record_span(raw.id, raw.span);
            lower_scalar(raw)
        }
        RawValueKind::Reference(path) => {
            if let Some(&dep_idx) = name_to_idx.get(path) {
                let dep_id = resolve_one_alias(dep_idx, decls, name_to_idx, marks, doc, strict, stack)?;
                let dep_value = doc.aliases[dep_id].value.clone();
                doc.record_span(raw.id, raw.span);
                return Ok(Value::new(dep_value.kind, raw.id));
            }
            resolve_reference_value(doc, *path, raw.span, raw.id, strict)
        }
        RawValueKind::List(_) | RawValueKind::Map(_) | RawValueKind::Record { .. } => {
            Err(ResolveError::AliasValueNotScalar { span: raw.span })
        }
    }
}

fn lower_scalar(raw: &RawValue) -> ResolveResult<Value> {
    let kind = match &raw.kind {
        RawValueKind::Null => ValueKind::Null,
        RawValueKind::Bool(b) => ValueKind::Bool(*b),
        RawValueKind::Integer(i) => ValueKind::Integer(*i),
        RawValueKind::Float(f) => {
            if !f.is_finite() {
                return Err(ResolveError::NonFiniteFloat { span: raw.span });
            }
            ValueKind::Float(*f)
        }
        RawValueKind::String(s) => ValueKind::String(*s),
        _ => unreachable!("lower_scalar called on a non-scalar RawValue"),
    };
    Ok(Value::new(kind, raw.id))
}

// ---------------------------------------------------------------------
// pass 3: reference & type
// ---------------------------------------------------------------------

/// Resolves a `@path` against, in order, the alias table, the schema
/// table, then a dotted `schema.field` path.
fn resolve_reference_value(
    doc: &mut Document,
    path: Symbol,
    span: Span,
    id: hedl_model::NodeId,
    strict: bool,
) -> ResolveResult<Value> {
    let text = doc.interner.resolve(path).to_string();

    let target = if let Some(aid) = doc.alias_by_name(path) {
        Some(ReferenceTarget::Alias(aid))
    } else if let Some(sid) = doc.schema_by_name(path) {
        Some(ReferenceTarget::Schema(sid))
    } else if let Some(dot) = text.find('.') {
        let schema_part = &text[..dot];
        let field_part = &text[dot + 1..];
        let schema_sym = doc.interner.intern(schema_part);
        let field_sym = doc.interner.intern(field_part);
        doc.schema_by_name(schema_sym)
            .and_then(|sid| doc.schemas[sid].field_index(field_sym).map(|idx| ReferenceTarget::SchemaField(sid, idx)))
    } else {
        None
    };

    doc.record_span(id, span);
    match target {
        Some(t) => Ok(Value::new(ValueKind::Reference(Reference { path, target: Some(t) }), id)),
        None if strict => Err(ResolveError::UnresolvedReference { path: text, span }),
        None => {
            doc.diagnostics.push(Diagnostic::new(
                codes::W_UNRESOLVED_REFERENCE_LENIENT,
                format!("unresolved reference '@{text}'"),
                span,
            ));
            Ok(Value::new(ValueKind::Reference(Reference { path, target: None }), id))
        }
    }
}

fn lower_value(doc: &mut Document, raw: &RawValue, strict: bool) -> ResolveResult<Value> {
    match &raw.kind {
        RawValueKind::Reference(path) => resolve_reference_value(doc, *path, raw.span, raw.id, strict),
        RawValueKind::Null | RawValueKind::Bool(_) | RawValueKind::Integer(_) | RawValueKind::Float(_)
        | RawValueKind::String(_) => {
            doc.record_span(raw.id, raw.span);
            lower_scalar(raw)
        }
        RawValueKind::List(RawList::Flat(items)) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(lower_value(doc, item, strict)?);
            }
            doc.record_span(raw.id, raw.span);
            Ok(Value::new(ValueKind::List(ListValue::Flat(values)), raw.id))
        }
        RawValueKind::List(RawList::Matrix(rows, schema_sym)) => {
            let schema_id = doc.schema_by_name(*schema_sym).ok_or_else(|| ResolveError::UnresolvedReference {
                path: doc.interner.resolve(*schema_sym).to_string(),
                span: raw.span,
            })?;
            let mut out_rows = Vec::with_capacity(rows.len());
            for row in rows {
                out_rows.push(lower_record_fields(doc, schema_id, row, raw.span, strict)?);
            }
            check_matrix_rectangular(&out_rows, raw.span)?;
            doc.record_span(raw.id, raw.span);
            Ok(Value::new(ValueKind::List(ListValue::Matrix { schema: schema_id, rows: out_rows }), raw.id))
        }
        RawValueKind::Map(entries) => {
            let mut map = IndexMap::new();
            for (k, v) in entries {
                let value = lower_value(doc, v, strict)?;
                map.insert(*k, value);
            }
            doc.record_span(raw.id, raw.span);
            Ok(Value::new(ValueKind::Map(map), raw.id))
        }
        RawValueKind::Record { schema, fields } => {
            let schema_id = doc.schema_by_name(*schema).ok_or_else(|| ResolveError::UnresolvedReference {
                path: doc.interner.resolve(*schema).to_string(),
                span: raw.span,
            })?;
            let map = lower_record_fields(doc, schema_id, fields, raw.span, strict)?;
            doc.record_span(raw.id, raw.span);
            Ok(Value::new(ValueKind::Record { schema: schema_id, fields: map }, raw.id))
        }
    }
}

/// Binds one record literal's fields against its schema in declaration
/// order: present and well-typed, or filled from the field's default, or a
/// hard [`ResolveError::MissingField`]/[`ResolveError::ExtraField`].
fn lower_record_fields(
    doc: &mut Document,
    schema_id: SchemaId,
    raw_fields: &[(Symbol, RawValue)],
    span: Span,
    strict: bool,
) -> ResolveResult<IndexMap<Symbol, Value>> {
    let schema_name = doc.interner.resolve(doc.schemas[schema_id].name).to_string();
    let mut by_name: FxHashMap<Symbol, &RawValue> = FxHashMap::default();
    for (k, v) in raw_fields {
        if by_name.insert(*k, v).is_some() {
            return Err(ResolveError::DuplicateField {
                schema: schema_name.clone(),
                field: doc.interner.resolve(*k).to_string(),
                span: v.span,
                first: v.span,
            });
        }
    }

    let field_count = doc.schemas[schema_id].fields.len();
    let mut out = IndexMap::with_capacity(field_count);
    for i in 0..field_count {
        let decl: FieldDecl = doc.schemas[schema_id].fields[i].clone();
        match by_name.remove(&decl.name) {
            Some(raw_val) => {
                let mut lowered = lower_value(doc, raw_val, strict)?;
                check_type(doc, &decl, &lowered, raw_val.span)?;
                if let (FieldType::Float, ValueKind::Integer(i)) = (decl.ty, &lowered.kind) {
                    lowered.kind = ValueKind::Float(*i as f64);
                }
                out.insert(decl.name, lowered);
            }
            None => {
                if decl.optional {
                    let default = decl.default.clone().expect("optional fields always carry a default by pass 2b");
                    out.insert(decl.name, default);
                } else {
                    return Err(ResolveError::MissingField {
                        schema: schema_name.clone(),
                        field: doc.interner.resolve(decl.name).to_string(),
                        span,
                    });
                }
            }
        }
    }

    if let Some((extra_name, extra_val)) = by_name.into_iter().next() {
        return Err(ResolveError::ExtraField {
            schema: schema_name,
            field: doc.interner.resolve(extra_name).to_string(),
            span: extra_val.span,
        });
    }

    Ok(out)
}

fn check_type(doc: &Document, decl: &FieldDecl, value: &Value, span: Span) -> ResolveResult<()> {
    let field_name = || doc.interner.resolve(decl.name).to_string();
    match (decl.ty, &value.kind) {
        (FieldType::Bool, ValueKind::Bool(_)) => Ok(()),
        (FieldType::Integer, ValueKind::Integer(_)) => Ok(()),
        (FieldType::Float, ValueKind::Float(_)) => Ok(()),
        (FieldType::Float, ValueKind::Integer(_)) => Ok(()), // widening, permitted
        (FieldType::String, ValueKind::String(_)) => Ok(()),
        (FieldType::Reference, ValueKind::Reference(_)) => Ok(()),
        (FieldType::Schema(expected), ValueKind::Record { schema, .. }) if *schema == expected => Ok(()),
        (_, ValueKind::Null) if decl.optional => Ok(()),
        (FieldType::Reference, ValueKind::String(_)) => {
            Err(ResolveError::ReferenceStringForbidden { field: field_name(), span })
        }
        _ => Err(ResolveError::TypeMismatch { field: field_name(), span }),
    }
}

/// Rechecks the parser's matrix classification. Every row here was built
/// from the same schema's declared field order via [`lower_record_fields`],
/// so this should never fire in practice -- it guards against an AST built
/// by something other than `hedl_par::Parser`.
fn check_matrix_rectangular(rows: &[IndexMap<Symbol, Value>], span: Span) -> ResolveResult<()> {
    let Some(first) = rows.first() else { return Ok(()) };
    let expected: Vec<Symbol> = first.keys().copied().collect();
    for row in &rows[1..] {
        let keys: Vec<Symbol> = row.keys().copied().collect();
        if keys != expected {
            return Err(ResolveError::RaggedMatrix { span });
        }
    }
    Ok(())
}

fn max_node_id(ast: &Ast) -> u32 {
    let mut max = 0u32;
    let mut bump = |id: hedl_model::NodeId| max = max.max(id.index() as u32);

    fn walk(v: &RawValue, bump: &mut impl FnMut(hedl_model::NodeId)) {
        bump(v.id);
        match &v.kind {
            RawValueKind::List(RawList::Flat(items)) => items.iter().for_each(|i| walk(i, bump)),
            RawValueKind::List(RawList::Matrix(rows, _)) => {
                for row in rows {
                    for (_, f) in row {
                        walk(f, bump);
                    }
                }
            }
            RawValueKind::Map(entries) => entries.iter().for_each(|(_, v)| walk(v, bump)),
            RawValueKind::Record { fields, .. } => fields.iter().for_each(|(_, v)| walk(v, bump)),
            _ => {}
        }
    }

    for decl in &ast.schemas {
        for f in &decl.fields {
            if let Some(default) = &f.default {
                walk(default, &mut bump);
            }
        }
    }
    for decl in &ast.aliases {
        walk(&decl.value, &mut bump);
    }
    for entry in &ast.body {
        walk(&entry.value, &mut bump);
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedl_lex::Lexer;
    use hedl_model::RootItemId;
    use hedl_par::Parser;
    use hedl_util::FileId;

    fn resolve_src(src: &str, strict: bool) -> ResolveResult<Document> {
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, FileId::DUMMY, &mut interner).tokenize().unwrap();
        let ast = Parser::new(tokens, src, &interner).parse().unwrap();
        resolve(ast, interner, strict)
    }

    #[test]
    fn s1_parse_and_inspect() {
        let doc = resolve_src("%VERSION: 1.0\n---\nname: Alice\nage: 30\n", true).unwrap();
        assert_eq!((doc.major, doc.minor), (1, 0));
        assert_eq!(doc.schema_count(), 0);
        assert_eq!(doc.alias_count(), 0);
        assert_eq!(doc.root_item_count(), 2);
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn s2_alias_substitution_is_not_inlined() {
        let doc = resolve_src("%VERSION: 1.0\n%ALIAS: prod = production\n---\nenvironment: @prod\n", true).unwrap();
        assert_eq!(doc.root_item_count(), 1);
        let item = &doc.root_items[RootItemId::from_usize(0)];
        match &item.value.kind {
            ValueKind::Reference(r) => {
                let target = r.target.expect("reference must resolve in strict mode");
                assert!(matches!(target, ReferenceTarget::Alias(_)));
            }
            other => panic!("expected unresolved reference node, got {other:?}"),
        }
        let alias = &doc.aliases[doc.alias_by_name(doc.interner.intern("prod")).unwrap()];
        assert_eq!(alias.value.kind, ValueKind::String(doc.interner.intern("production")));
    }

    #[test]
    fn s4_strict_unresolved_reference_is_hard_error() {
        let err = resolve_src("%VERSION: 1.0\n---\nref: @missing\n", true).unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvedReference { .. }));
    }

    #[test]
    fn s4_lenient_unresolved_reference_is_soft() {
        let doc = resolve_src("%VERSION: 1.0\n---\nref: @missing\n", false).unwrap();
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].code, codes::W_UNRESOLVED_REFERENCE_LENIENT);
    }

    #[test]
    fn s5_alias_cycle_is_rejected() {
        let err = resolve_src("%VERSION: 1.0\n%ALIAS: a = @b\n%ALIAS: b = @a\n---\nx: @a\n", true).unwrap_err();
        assert!(matches!(err, ResolveError::AliasCycle { .. }));
    }

    #[test]
    fn duplicate_schema_name_is_rejected() {
        let err =
            resolve_src("%VERSION: 1.0\n%SCHEMA: A { x: int }\n%SCHEMA: A { y: int }\n---\nk: 1\n", true).unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateName { .. }));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = resolve_src(
            "%VERSION: 1.0\n%SCHEMA: Point { x: int, y: int }\n---\np: Point { x: 1 }\n",
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::MissingField { .. }));
    }

    #[test]
    fn optional_field_absent_fills_declared_default() {
        let doc = resolve_src(
            "%VERSION: 1.0\n%SCHEMA: Point { x: int, y?: int = 0 }\n---\np: Point { x: 1 }\n",
            true,
        )
        .unwrap();
        let item = &doc.root_items[RootItemId::from_usize(0)];
        match &item.value.kind {
            ValueKind::Record { fields, .. } => {
                let y_name = doc.interner.intern("y");
                assert_eq!(fields[&y_name].kind, ValueKind::Integer(0));
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn integer_widens_into_float_field() {
        let doc = resolve_src("%VERSION: 1.0\n%SCHEMA: S { f: float }\n---\nv: S { f: 3 }\n", true).unwrap();
        let item = &doc.root_items[RootItemId::from_usize(0)];
        match &item.value.kind {
            ValueKind::Record { fields, .. } => {
                let f_name = doc.interner.intern("f");
                assert_eq!(fields[&f_name].kind, ValueKind::Float(3.0));
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn string_into_reference_field_is_forbidden() {
        let err = resolve_src(
            "%VERSION: 1.0\n%SCHEMA: S { r: ref }\n---\nv: S { r: not_a_ref }\n",
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::ReferenceStringForbidden { .. }));
    }

    #[test]
    fn extra_field_is_rejected() {
        let err = resolve_src("%VERSION: 1.0\n%SCHEMA: S { x: int }\n---\nv: S { x: 1, y: 2 }\n", true).unwrap_err();
        assert!(matches!(err, ResolveError::ExtraField { .. }));
    }

    #[test]
    fn matrix_list_resolves_rows_against_schema() {
        let doc = resolve_src(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrows: [Row { a: 1 }, Row { a: 2 }]\n",
            true,
        )
        .unwrap();
        let item = &doc.root_items[RootItemId::from_usize(0)];
        match &item.value.kind {
            ValueKind::List(ListValue::Matrix { rows, .. }) => assert_eq!(rows.len(), 2),
            other => panic!("expected matrix, got {other:?}"),
        }
    }

    #[test]
    fn missing_version_defaults_to_one_zero() {
        let doc = resolve_src("---\nk: 1\n", true).unwrap();
        assert_eq!((doc.major, doc.minor), (1, 0));
    }

    #[test]
    fn unknown_major_version_is_a_hard_error() {
        let err = resolve_src("%VERSION: 2.0\n---\nk: 1\n", true).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownMajorVersion { major: 2, .. }));
    }

    #[test]
    fn unknown_minor_version_is_a_soft_warning() {
        let doc = resolve_src("%VERSION: 1.7\n---\nk: 1\n", true).unwrap();
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(doc.diagnostics[0].code, codes::W_UNKNOWN_MINOR_VERSION);
    }

    #[test]
    fn schema_and_alias_names_are_globally_unique() {
        let err = resolve_src("%VERSION: 1.0\n%SCHEMA: prod { x: int }\n%ALIAS: prod = 1\n---\nk: 1\n", true)
            .unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateName { .. }));
    }

    #[test]
    fn schemas_declared_out_of_order_resolve_forward_field_references() {
        let doc =
            resolve_src("%VERSION: 1.0\n%SCHEMA: B { x: int }\n%SCHEMA: A { inner: B }\n---\nk: 1\n", true).unwrap();
        assert_eq!(doc.schema_count(), 2);
    }

    #[test]
    fn float_literal_overflowing_to_infinity_is_rejected() {
        let err = resolve_src("%VERSION: 1.0\n---\nk: 1e400\n", true).unwrap_err();
        assert!(matches!(err, ResolveError::NonFiniteFloat { .. }));
    }

    #[test]
    fn alias_float_overflowing_to_infinity_is_rejected() {
        let err = resolve_src("%VERSION: 1.0\n%ALIAS: huge = 1e400\n---\nk: @huge\n", true).unwrap_err();
        assert!(matches!(err, ResolveError::NonFiniteFloat { .. }));
    }
}
