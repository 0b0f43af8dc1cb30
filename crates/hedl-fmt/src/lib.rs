//! hedl-fmt - The Canonicalizer: byte-deterministic HEDL text rendering.
//!
//! Renders a resolved [`hedl_model::Document`] to a byte-deterministic HEDL
//! text form: two observationally equivalent documents (same schemas, same
//! aliases after resolution, same root items in the same order) canonicalize
//! to identical bytes. Canonicalization never inlines an alias -- a
//! `Reference` whose target is an alias is printed back as `@name`, even
//! though the alias's own resolved value is available on the `Document`.

pub mod error;

use error::{FormatError, FormatResult};
use hedl_model::{Document, FieldType, ListValue, Reference, Schema, Value, ValueKind};
use hedl_util::Symbol;
use indexmap::IndexMap;

const MAX_LINE_WIDTH: usize = 80;
const INDENT_UNIT: &str = "  ";

/// Render `doc` to its canonical HEDL text.
pub fn canonicalize(doc: &Document) -> FormatResult<String> {
    let mut out = String::new();
    out.push_str(&format!("%VERSION: {}.{}\n", doc.major, doc.minor));

    let mut schema_order: Vec<usize> = (0..doc.schemas.len()).collect();
    schema_order.sort_by_key(|&i| doc.interner.resolve(doc.schemas.as_slice()[i].name));
    for &i in &schema_order {
        render_schema_directive(doc, &doc.schemas.as_slice()[i], &mut out)?;
    }

    let mut alias_order: Vec<usize> = (0..doc.aliases.len()).collect();
    alias_order.sort_by_key(|&i| doc.interner.resolve(doc.aliases.as_slice()[i].name));
    for &i in &alias_order {
        let alias = &doc.aliases.as_slice()[i];
        let name = doc.interner.resolve(alias.name);
        let prefix = format!("%ALIAS: {} = ", name);
        let value = render_value(doc, &alias.value, prefix.len(), 0)?;
        out.push_str(&prefix);
        out.push_str(&value);
        out.push('\n');
    }

    out.push_str("---\n");

    for item in doc.root_items.iter() {
        let key = doc.interner.resolve(item.key);
        render_field(doc, key, &item.value, 0, &mut out)?;
    }

    Ok(out)
}

fn render_schema_directive(doc: &Document, schema: &Schema, out: &mut String) -> FormatResult<()> {
    let name = doc.interner.resolve(schema.name);
    out.push_str("%SCHEMA: ");
    out.push_str(name);
    out.push_str(" { ");
    for (i, field) in schema.fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        render_field_decl(doc, field, out)?;
    }
    if schema.fields.is_empty() {
        out.pop(); // drop the trailing space before '}' when there are no fields
    }
    out.push_str("}\n");
    Ok(())
}

fn render_field_decl(doc: &Document, field: &hedl_model::FieldDecl, out: &mut String) -> FormatResult<()> {
    let name = doc.interner.resolve(field.name);
    out.push_str(name);
    if field.optional {
        out.push('?');
    }
    out.push_str(": ");
    out.push_str(&field_type_name(doc, field.ty));
    if field.optional {
        if let Some(default) = &field.default {
            if !default.is_null() {
                out.push_str(" = ");
                let rendered = render_value(doc, default, current_column(out), 0)?;
                out.push_str(&rendered);
            }
        }
    }
    Ok(())
}

/// Character offset from the start of `out`'s current (last) line.
fn current_column(out: &str) -> usize {
    match out.rfind('\n') {
        Some(pos) => out[pos + 1..].chars().count(),
        None => out.chars().count(),
    }
}

fn field_type_name(doc: &Document, ty: FieldType) -> String {
    match ty {
        FieldType::Bool => "bool".to_string(),
        FieldType::Integer => "int".to_string(),
        FieldType::Float => "float".to_string(),
        FieldType::String => "string".to_string(),
        FieldType::Reference => "ref".to_string(),
        FieldType::Schema(id) => doc.interner.resolve(doc.schemas[id].name).to_string(),
    }
}

/// Render one `key: value` body line; root items keep insertion order.
/// A non-empty bare [`ValueKind::Map`] that does not fit on one line uses
/// the brace-less `INDENT (key: value NEWLINE)* DEDENT` form rather than a
/// multi-line `{ ... }`, since only a field/root-item position has the
/// leading `key:` that form depends on.
fn render_field(doc: &Document, key: &str, value: &Value, indent: usize, out: &mut String) -> FormatResult<()> {
    let prefix = INDENT_UNIT.repeat(indent);
    match &value.kind {
        ValueKind::Map(map) if !map.is_empty() => {
            let flow = render_map_flow(doc, map)?;
            let col = prefix.chars().count() + key.chars().count() + 2;
            if col + flow.chars().count() <= MAX_LINE_WIDTH {
                out.push_str(&prefix);
                out.push_str(key);
                out.push_str(": ");
                out.push_str(&flow);
                out.push('\n');
            } else {
                out.push_str(&prefix);
                out.push_str(key);
                out.push_str(":\n");
                render_map_entries_block(doc, map, indent + 1, out)?;
            }
        }
        _ => {
            let col = prefix.chars().count() + key.chars().count() + 2;
            let rendered = render_value(doc, value, col, indent)?;
            out.push_str(&prefix);
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&rendered);
            out.push('\n');
        }
    }
    Ok(())
}

fn render_map_entries_block(
    doc: &Document,
    map: &IndexMap<Symbol, Value>,
    indent: usize,
    out: &mut String,
) -> FormatResult<()> {
    for (key, value) in map {
        render_field(doc, doc.interner.resolve(*key), value, indent, out)?;
    }
    Ok(())
}

/// Render `value` at column `col` (where its first character lands),
/// choosing flow form when the whole value fits in [`MAX_LINE_WIDTH`]
/// columns, block form otherwise. Used for everything except a
/// bare [`ValueKind::Map`] in field/root position (see [`render_field`]).
fn render_value(doc: &Document, value: &Value, col: usize, indent: usize) -> FormatResult<String> {
    match &value.kind {
        ValueKind::Null => Ok("null".to_string()),
        ValueKind::Bool(b) => Ok(if *b { "true" } else { "false" }.to_string()),
        ValueKind::Integer(i) => Ok(i.to_string()),
        ValueKind::Float(f) => render_float(*f),
        ValueKind::String(sym) => Ok(render_string(doc.interner.resolve(*sym))),
        ValueKind::Reference(r) => Ok(render_reference(doc, r)),
        ValueKind::Map(map) => {
            let flow = render_map_flow(doc, map)?;
            if map.is_empty() || col + flow.chars().count() <= MAX_LINE_WIDTH {
                Ok(flow)
            } else {
                render_map_block_braced(doc, map, indent)
            }
        }
        ValueKind::List(ListValue::Flat(items)) => render_list(doc, items, col, indent),
        ValueKind::List(ListValue::Matrix { rows, .. }) => {
            render_matrix(doc, value, rows, col, indent)
        }
        ValueKind::Record { schema, fields } => render_record(doc, *schema, fields, col, indent),
    }
}

fn render_reference(doc: &Document, r: &Reference) -> String {
    format!("@{}", doc.interner.resolve(r.path))
}

/// Shortest round-trip IEEE 754 binary64 decimal form, always containing a
/// decimal point or exponent so it is never mistaken for an integer.
/// `-0.0` normalizes to `0.0`. `NaN`/`±∞` cannot reach here since the
/// resolver rejects them before a `Document` exists; [`FormatError::NonFiniteFloat`]
/// exists for the case where that invariant is ever violated upstream.
fn render_float(f: f64) -> FormatResult<String> {
    if !f.is_finite() {
        return Err(FormatError::NonFiniteFloat);
    }
    if f == 0.0 {
        return Ok("0.0".to_string());
    }
    let s = format!("{f}");
    if s.contains('.') || s.contains('e') || s.contains('E') {
        Ok(s)
    } else {
        Ok(format!("{s}.0"))
    }
}

/// Double-quoted string, escaping only `\ " \n \r \t` and control bytes
/// below `0x20`; non-ASCII UTF-8 passes through untouched.
fn render_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A pure single-line flow candidate for `map`, ignoring width.
///
/// A child that itself has no room to stay inline renders its own block
/// form here, which embeds a newline; that makes this candidate's char
/// count balloon past [`MAX_LINE_WIDTH`] and the caller's width check
/// rejects it in favor of block form, so no separate check is needed here.
fn render_map_flow(doc: &Document, map: &IndexMap<Symbol, Value>) -> FormatResult<String> {
    if map.is_empty() {
        return Ok("{}".to_string());
    }
    let mut parts = Vec::with_capacity(map.len());
    for (key, value) in map {
        let key_text = doc.interner.resolve(*key);
        let value_flow = render_value(doc, value, 0, 0)?;
        parts.push(format!("{key_text}: {value_flow}"));
    }
    Ok(format!("{{ {} }}", parts.join(", ")))
}

fn render_map_block_braced(doc: &Document, map: &IndexMap<Symbol, Value>, indent: usize) -> FormatResult<String> {
    let inner_indent = INDENT_UNIT.repeat(indent + 1);
    let close_indent = INDENT_UNIT.repeat(indent);
    let mut out = String::from("{\n");
    for (key, value) in map {
        let key_text = doc.interner.resolve(*key);
        let col = inner_indent.chars().count() + key_text.chars().count() + 2;
        let rendered = render_value(doc, value, col, indent + 1)?;
        out.push_str(&inner_indent);
        out.push_str(key_text);
        out.push_str(": ");
        out.push_str(&rendered);
        out.push_str(",\n");
    }
    out.push_str(&close_indent);
    out.push('}');
    Ok(out)
}

fn render_list(doc: &Document, items: &[Value], col: usize, indent: usize) -> FormatResult<String> {
    if items.is_empty() {
        return Ok("[]".to_string());
    }
    let flow_items: Vec<String> = items
        .iter()
        .map(|v| render_value(doc, v, 0, 0))
        .collect::<FormatResult<Vec<_>>>()?;
    if flow_items.iter().all(|s| !s.contains('\n')) {
        let flow = format!("[{}]", flow_items.join(", "));
        if col + flow.chars().count() <= MAX_LINE_WIDTH {
            return Ok(flow);
        }
    }
    let inner_indent = INDENT_UNIT.repeat(indent + 1);
    let close_indent = INDENT_UNIT.repeat(indent);
    let mut out = String::from("[\n");
    for item in items {
        let rendered = render_value(doc, item, inner_indent.chars().count(), indent + 1)?;
        out.push_str(&inner_indent);
        out.push_str(&rendered);
        out.push_str(",\n");
    }
    out.push_str(&close_indent);
    out.push(']');
    Ok(out)
}

fn render_matrix(
    doc: &Document,
    value: &Value,
    rows: &[IndexMap<Symbol, Value>],
    col: usize,
    indent: usize,
) -> FormatResult<String> {
    let ValueKind::List(ListValue::Matrix { schema, .. }) = &value.kind else {
        unreachable!("render_matrix called on a non-matrix Value");
    };
    let record_items: Vec<Value> = rows
        .iter()
        .map(|row| Value::new(ValueKind::Record { schema: *schema, fields: row.clone() }, value.id))
        .collect();
    render_list(doc, &record_items, col, indent)
}

fn render_record(
    doc: &Document,
    schema: hedl_model::SchemaId,
    fields: &IndexMap<Symbol, Value>,
    col: usize,
    indent: usize,
) -> FormatResult<String> {
    let name = doc.interner.resolve(doc.schemas[schema].name);
    if fields.is_empty() {
        return Ok(format!("{name} {{}}"));
    }
    let flow_fields: Vec<String> = fields
        .iter()
        .map(|(k, v)| render_value(doc, v, 0, 0).map(|rv| (doc.interner.resolve(*k).to_string(), rv)))
        .collect::<FormatResult<Vec<_>>>()?
        .into_iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect();
    if flow_fields.iter().all(|s| !s.contains('\n')) {
        let flow = format!("{name} {{ {} }}", flow_fields.join(", "));
        if col + flow.chars().count() <= MAX_LINE_WIDTH {
            return Ok(flow);
        }
    }
    let inner_indent = INDENT_UNIT.repeat(indent + 1);
    let close_indent = INDENT_UNIT.repeat(indent);
    let mut out = format!("{name} {{\n");
    for (key, value) in fields {
        let key_text = doc.interner.resolve(*key);
        let field_col = inner_indent.chars().count() + key_text.chars().count() + 2;
        let rendered = render_value(doc, value, field_col, indent + 1)?;
        out.push_str(&inner_indent);
        out.push_str(key_text);
        out.push_str(": ");
        out.push_str(&rendered);
        out.push_str(",\n");
    }
    out.push_str(&close_indent);
    out.push('}');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedl_lex::Lexer;
    use hedl_par::Parser;
    use hedl_sem::resolve;
    use hedl_util::{symbol::Interner, FileId};

    fn canon(src: &str) -> String {
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, FileId::DUMMY, &mut interner).tokenize().unwrap();
        let ast = Parser::new(tokens, src, &interner).parse().unwrap();
        let doc = resolve(ast, interner, true).unwrap();
        canonicalize(&doc).unwrap()
    }

    #[test]
    fn s1_round_trips_flat_body() {
        let out = canon("%VERSION: 1.0\n---\nname: Alice\nage: 30\n");
        assert_eq!(out, "%VERSION: 1.0\n---\nname: \"Alice\"\nage: 30\n");
    }

    #[test]
    fn s2_alias_is_preserved_textually_not_inlined() {
        let out = canon("%VERSION: 1.0\n%ALIAS: prod = production\n---\nenvironment: @prod\n");
        assert!(out.contains("%ALIAS: prod = \"production\"\n"));
        assert!(out.contains("environment: @prod\n"));
        assert!(!out.contains("environment: \"production\""));
    }

    #[test]
    fn s3_schemas_sort_lexicographically() {
        let out = canon("%VERSION: 1.0\n%SCHEMA: B { x: int }\n%SCHEMA: A { y: int }\n---\nk: 1\n");
        let a_pos = out.find("%SCHEMA: A").unwrap();
        let b_pos = out.find("%SCHEMA: B").unwrap();
        assert!(a_pos < b_pos);
        assert!(out.ends_with("---\nk: 1\n"));
    }

    #[test]
    fn idempotent_on_its_own_output() {
        let src = "%VERSION: 1.0\n%SCHEMA: Row { a: int, b?: int = 0 }\n---\nrows: [Row { a: 1 }, Row { a: 2 }]\nname: \"x\"\n";
        let once = canon(src);
        let twice = canon(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn negative_zero_normalizes_to_positive() {
        let out = canon("%VERSION: 1.0\n---\nf: -0.0\n");
        assert!(out.contains("f: 0.0\n"));
    }

    #[test]
    fn integer_has_no_decimal_point() {
        let out = canon("%VERSION: 1.0\n---\nf: 3.0\nk: 3\n");
        assert!(out.contains("f: 3.0\n"));
        assert!(out.contains("k: 3\n"));
    }

    #[test]
    fn empty_body_canonicalizes_to_itself() {
        let out = canon("%VERSION: 1.0\n---\n");
        assert_eq!(out, "%VERSION: 1.0\n---\n");
    }

    #[test]
    fn block_map_round_trips_through_indent_form() {
        let out = canon("%VERSION: 1.0\n---\nparent:\n  child: 1\n");
        assert_eq!(out, "%VERSION: 1.0\n---\nparent:\n  child: 1\n");
    }

    #[test]
    fn string_escapes_minimal_set() {
        let out = canon("%VERSION: 1.0\n---\ns: \"a\\nb\\tc\"\n");
        assert!(out.contains("s: \"a\\nb\\tc\"\n"));
    }
}
