//! hedl-lint - The Linter: advisory diagnostics over a resolved document.
//!
//! Produces advisory diagnostics over an already-resolved
//! [`hedl_model::Document`] without mutating it. Severity follows the
//! document's own conventions: redundancy and portability concerns are
//! `Hint`, questionable-but-legal shapes are `Warning`, and a reference left
//! dangling by lenient-mode resolution is surfaced here as a full `Error` --
//! the linter is where a lenient parse's deferred failures finally become
//! visible to a caller who asks for them.

use hedl_model::{AliasId, Document, ListValue, Reference, ReferenceTarget, SchemaId, Value, ValueKind};
use hedl_util::diagnostic::{codes, Diagnostic};
use hedl_util::{FxHashSet, Symbol};

const MAX_MAP_NESTING: usize = 8;

/// Run every required check and return the findings, ordered by primary
/// span start.
pub fn lint(doc: &Document) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let mut usage = Usage::default();

    for alias in doc.aliases.iter() {
        walk_value(doc, &alias.value, 1, &mut usage, &mut out);
        check_non_ascii(doc.interner.resolve(alias.name), alias.span, &mut out);
    }
    for schema in doc.schemas.iter() {
        check_non_ascii(doc.interner.resolve(schema.name), schema.span, &mut out);
        for field in &schema.fields {
            check_non_ascii(doc.interner.resolve(field.name), field.span, &mut out);
            if let Some(default) = &field.default {
                walk_value(doc, default, 1, &mut usage, &mut out);
            }
        }
    }
    for item in doc.root_items.iter() {
        check_non_ascii(doc.interner.resolve(item.key), item.span, &mut out);
        walk_value(doc, &item.value, 1, &mut usage, &mut out);
    }

    check_unused_aliases(doc, &usage, &mut out);
    check_unused_schemas(doc, &usage, &mut out);
    check_duplicate_alias_values(doc, &mut out);

    out.sort_by_key(|d| d.primary_span.start);
    out
}

#[derive(Default)]
struct Usage {
    aliases: FxHashSet<AliasId>,
    schemas: FxHashSet<SchemaId>,
}

fn note_reference(usage: &mut Usage, r: &Reference) {
    match r.target {
        Some(ReferenceTarget::Alias(id)) => {
            usage.aliases.insert(id);
        }
        Some(ReferenceTarget::Schema(id)) | Some(ReferenceTarget::SchemaField(id, _)) => {
            usage.schemas.insert(id);
        }
        None => {}
    }
}

/// Recursively visits `value`, feeding every check that needs to see the
/// whole value tree: alias/schema usage, unresolved references, the
/// all-optional-absent check, flat-but-matrix-shaped lists, deep nesting,
/// and non-ASCII map/record keys. `depth` counts composite containers
/// already entered, starting at 1 for a root item's own value.
fn walk_value(doc: &Document, value: &Value, depth: usize, usage: &mut Usage, out: &mut Vec<Diagnostic>) {
    match &value.kind {
        ValueKind::Null | ValueKind::Bool(_) | ValueKind::Integer(_) | ValueKind::Float(_) | ValueKind::String(_) => {}
        ValueKind::Reference(r) => {
            note_reference(usage, r);
            if r.target.is_none() {
                out.push(Diagnostic::new(
                    codes::E_RESOLVE_UNRESOLVED_REFERENCE,
                    format!("unresolved reference '@{}'", doc.interner.resolve(r.path)),
                    doc.span_of(value.id),
                ));
            }
        }
        ValueKind::List(ListValue::Flat(items)) => {
            check_flat_list_is_matrix_shaped(doc, value, items, out);
            for item in items {
                walk_value(doc, item, depth + 1, usage, out);
            }
        }
        ValueKind::List(ListValue::Matrix { schema, rows }) => {
            usage.schemas.insert(*schema);
            for row in rows {
                for (key, field_value) in row {
                    check_non_ascii(doc.interner.resolve(*key), doc.span_of(field_value.id), out);
                    walk_value(doc, field_value, depth + 2, usage, out);
                }
            }
        }
        ValueKind::Map(map) => {
            if depth > MAX_MAP_NESTING {
                out.push(Diagnostic::new(
                    codes::W_DEEP_NESTING,
                    format!("map nested {depth} levels deep exceeds the recommended maximum of {MAX_MAP_NESTING}"),
                    doc.span_of(value.id),
                ));
            }
            for (key, field_value) in map {
                check_non_ascii(doc.interner.resolve(*key), doc.span_of(field_value.id), out);
                walk_value(doc, field_value, depth + 1, usage, out);
            }
        }
        ValueKind::Record { schema, fields } => {
            usage.schemas.insert(*schema);
            check_all_optional_absent(doc, *schema, fields, value, out);
            for (key, field_value) in fields {
                check_non_ascii(doc.interner.resolve(*key), doc.span_of(field_value.id), out);
                walk_value(doc, field_value, depth + 1, usage, out);
            }
        }
    }
}

fn check_all_optional_absent(
    doc: &Document,
    schema: SchemaId,
    fields: &indexmap::IndexMap<Symbol, Value>,
    record: &Value,
    out: &mut Vec<Diagnostic>,
) {
    let decl = &doc.schemas[schema];
    let optional: Vec<_> = decl.fields.iter().filter(|f| f.optional).collect();
    if optional.is_empty() {
        return;
    }
    let all_absent = optional.iter().all(|f| fields.get(&f.name).map(Value::is_null).unwrap_or(true));
    if all_absent {
        out.push(Diagnostic::new(
            codes::W_ALL_OPTIONAL_ABSENT,
            format!(
                "record of schema '{}' has every optional field absent",
                doc.interner.resolve(decl.name)
            ),
            doc.span_of(record.id),
        ));
    }
}

/// A flat list whose elements are all records of one schema will, after
/// resolution, already share identical field order (`hedl_sem`'s record
/// lowering always lays fields out in schema-declaration order) -- so any
/// such list could have been written as a matrix and was not.
fn check_flat_list_is_matrix_shaped(doc: &Document, list: &Value, items: &[Value], out: &mut Vec<Diagnostic>) {
    if items.len() < 2 {
        return;
    }
    let first_schema = match &items[0].kind {
        ValueKind::Record { schema, .. } => *schema,
        _ => return,
    };
    let uniform = items.iter().all(|item| matches!(&item.kind, ValueKind::Record { schema, .. } if *schema == first_schema));
    if uniform {
        out.push(Diagnostic::new(
            codes::H_FLAT_LIST_IS_MATRIX,
            format!(
                "every element shares schema '{}' with matching field order; this list qualifies as a matrix list",
                doc.interner.resolve(doc.schemas[first_schema].name)
            ),
            doc.span_of(list.id),
        ));
    }
}

fn check_unused_aliases(doc: &Document, usage: &Usage, out: &mut Vec<Diagnostic>) {
    for (id, alias) in doc.aliases.iter_enumerated() {
        if !usage.aliases.contains(&id) {
            out.push(Diagnostic::new(
                codes::W_UNUSED_ALIAS,
                format!("alias '{}' is never referenced", doc.interner.resolve(alias.name)),
                alias.span,
            ));
        }
    }
}

fn check_unused_schemas(doc: &Document, usage: &Usage, out: &mut Vec<Diagnostic>) {
    for (id, schema) in doc.schemas.iter_enumerated() {
        if !usage.schemas.contains(&id) {
            out.push(Diagnostic::new(
                codes::H_UNUSED_SCHEMA,
                format!("schema '{}' is never used", doc.interner.resolve(schema.name)),
                schema.span,
            ));
        }
    }
}

/// Two aliases whose resolved values are identical scalars-or-references are
/// redundant regardless of their distinct names. Alias values are
/// restricted to scalars and references (`hedl_sem::ResolveError::AliasValueNotScalar`),
/// so comparing `ValueKind` directly is exhaustive here.
fn check_duplicate_alias_values(doc: &Document, out: &mut Vec<Diagnostic>) {
    let aliases = doc.aliases.as_slice();
    for i in 0..aliases.len() {
        for j in (i + 1)..aliases.len() {
            if alias_values_equal(&aliases[i].value.kind, &aliases[j].value.kind) {
                out.push(
                    Diagnostic::new(
                        codes::H_DUPLICATE_ALIAS_VALUE,
                        format!(
                            "alias '{}' has the same value as alias '{}'",
                            doc.interner.resolve(aliases[j].name),
                            doc.interner.resolve(aliases[i].name)
                        ),
                        aliases[j].span,
                    )
                    .with_related(aliases[i].span, "other alias defined here"),
                );
            }
        }
    }
}

fn alias_values_equal(a: &ValueKind, b: &ValueKind) -> bool {
    match (a, b) {
        (ValueKind::Null, ValueKind::Null) => true,
        (ValueKind::Bool(x), ValueKind::Bool(y)) => x == y,
        (ValueKind::Integer(x), ValueKind::Integer(y)) => x == y,
        (ValueKind::Float(x), ValueKind::Float(y)) => x == y,
        (ValueKind::String(x), ValueKind::String(y)) => x == y,
        (ValueKind::Reference(x), ValueKind::Reference(y)) => match (x.target, y.target) {
            (Some(tx), Some(ty)) => tx == ty,
            _ => x.path == y.path,
        },
        _ => false,
    }
}

fn check_non_ascii(name: &str, span: hedl_util::Span, out: &mut Vec<Diagnostic>) {
    if !name.is_ascii() {
        out.push(Diagnostic::new(
            codes::H_NON_ASCII_IDENTIFIER,
            format!("identifier '{name}' contains non-ASCII characters"),
            span,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedl_lex::Lexer;
    use hedl_par::Parser;
    use hedl_sem::resolve;
    use hedl_util::{symbol::Interner, FileId};

    fn lint_src(src: &str, strict: bool) -> Vec<Diagnostic> {
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, FileId::DUMMY, &mut interner).tokenize().unwrap();
        let ast = Parser::new(tokens, src, &interner).parse().unwrap();
        let doc = resolve(ast, interner, strict).unwrap();
        lint(&doc)
    }

    fn has_code(diags: &[Diagnostic], code: hedl_util::DiagnosticCode) -> bool {
        diags.iter().any(|d| d.code == code)
    }

    #[test]
    fn unused_alias_is_a_warning() {
        let diags = lint_src("%VERSION: 1.0\n%ALIAS: a = 1\n---\nk: 2\n", true);
        assert!(has_code(&diags, codes::W_UNUSED_ALIAS));
    }

    #[test]
    fn unused_schema_is_a_hint() {
        let diags = lint_src("%VERSION: 1.0\n%SCHEMA: Row { x: int }\n---\nk: 1\n", true);
        assert!(has_code(&diags, codes::H_UNUSED_SCHEMA));
    }

    #[test]
    fn duplicate_alias_value_is_a_hint() {
        let diags = lint_src("%VERSION: 1.0\n%ALIAS: a = 1\n%ALIAS: b = 1\n---\nk: 2\n", true);
        assert!(has_code(&diags, codes::H_DUPLICATE_ALIAS_VALUE));
    }

    #[test]
    fn all_optional_absent_is_a_warning() {
        let diags = lint_src(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int, b?: int }\n---\nrow: Row { a: 1 }\n",
            true,
        );
        assert!(has_code(&diags, codes::W_ALL_OPTIONAL_ABSENT));
    }

    #[test]
    fn matrix_shaped_flat_list_is_a_hint() {
        let diags = lint_src(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int, b: int }\n---\nrows: [Row { b: 2, a: 1 }, Row { a: 3, b: 4 }]\n",
            true,
        );
        assert!(has_code(&diags, codes::H_FLAT_LIST_IS_MATRIX));
    }

    #[test]
    fn non_ascii_identifier_is_a_hint() {
        let diags = lint_src("%VERSION: 1.0\n---\nn\u{00e9}: 1\n", true);
        assert!(has_code(&diags, codes::H_NON_ASCII_IDENTIFIER));
    }

    #[test]
    fn lenient_unresolved_reference_surfaces_as_an_error() {
        let diags = lint_src("%VERSION: 1.0\n---\nref: @missing\n", false);
        let found = diags.iter().find(|d| d.code == codes::E_RESOLVE_UNRESOLVED_REFERENCE).unwrap();
        assert_eq!(found.severity, hedl_util::Severity::Error);
    }

    #[test]
    fn well_formed_document_has_no_findings() {
        let diags = lint_src(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrows: [Row { a: 1 }]\nlone: Row { a: 1 }\n",
            true,
        );
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    }
}
