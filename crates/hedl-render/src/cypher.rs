//! Cypher emission. No crate in the workspace speaks Cypher, so this is a
//! hand-written text generator: one `CREATE` statement per record, or per
//! matrix row, with its schema name as the node label.

use crate::error::{RenderError, RenderResult};
use hedl_traverse::{ListHandle, MapHandle, MatrixHandle, RecordFieldsHandle, RecordHandle, ReferenceHandle, ValueHandle, Visitor};

pub fn to_string(handle: ValueHandle) -> RenderResult<String> {
    let mut visitor = CypherVisitor { statements: Vec::new() };
    handle.visit(&mut visitor)?;
    Ok(visitor.statements.join("\n"))
}

struct CypherVisitor {
    statements: Vec<String>,
}

impl<'a> Visitor<'a> for CypherVisitor {
    type Output = RenderResult<()>;

    fn visit_null(&mut self) -> Self::Output {
        Err(RenderError::GraphRequiresRecord)
    }

    fn visit_bool(&mut self, _value: bool) -> Self::Output {
        Err(RenderError::GraphRequiresRecord)
    }

    fn visit_integer(&mut self, _value: i64) -> Self::Output {
        Err(RenderError::GraphRequiresRecord)
    }

    fn visit_float(&mut self, _value: f64) -> Self::Output {
        Err(RenderError::GraphRequiresRecord)
    }

    fn visit_string(&mut self, _value: &'a str) -> Self::Output {
        Err(RenderError::GraphRequiresRecord)
    }

    fn visit_reference(&mut self, _reference: ReferenceHandle<'a>) -> Self::Output {
        Err(RenderError::GraphRequiresRecord)
    }

    fn visit_flat_list(&mut self, _list: ListHandle<'a>) -> Self::Output {
        Err(RenderError::GraphRequiresRecord)
    }

    fn visit_map(&mut self, _map: MapHandle<'a>) -> Self::Output {
        Err(RenderError::GraphRequiresRecord)
    }

    fn visit_matrix_list(&mut self, matrix: MatrixHandle<'a>) -> Self::Output {
        let label = matrix.schema.name();
        for row in &matrix.rows {
            self.statements.push(create_statement(label, row));
        }
        Ok(())
    }

    fn visit_record(&mut self, record: RecordHandle<'a>) -> Self::Output {
        self.statements.push(create_statement(record.schema.name(), &record.fields));
        Ok(())
    }
}

fn create_statement(label: &str, fields: &RecordFieldsHandle<'_>) -> String {
    let props: Vec<String> = fields.iter().map(|(key, value)| format!("{key}: {}", cypher_literal(value))).collect();
    format!("CREATE (:{label} {{{}}})", props.join(", "))
}

fn cypher_literal(value: ValueHandle) -> String {
    let mut visitor = LiteralVisitor;
    value.visit(&mut visitor)
}

struct LiteralVisitor;

impl<'a> Visitor<'a> for LiteralVisitor {
    type Output = String;

    fn visit_null(&mut self) -> String {
        "null".to_string()
    }

    fn visit_bool(&mut self, value: bool) -> String {
        value.to_string()
    }

    fn visit_integer(&mut self, value: i64) -> String {
        value.to_string()
    }

    fn visit_float(&mut self, value: f64) -> String {
        value.to_string()
    }

    fn visit_string(&mut self, value: &'a str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
    }

    fn visit_reference(&mut self, reference: ReferenceHandle<'a>) -> String {
        format!("'@{}'", reference.path())
    }

    fn visit_flat_list(&mut self, list: ListHandle<'a>) -> String {
        let items: Vec<String> = list.map(|item| item.visit(self)).collect();
        format!("[{}]", items.join(", "))
    }

    fn visit_matrix_list(&mut self, matrix: MatrixHandle<'a>) -> String {
        format!("'<{} {} rows>'", matrix.rows.len(), matrix.schema.name())
    }

    fn visit_map(&mut self, map: MapHandle<'a>) -> String {
        let parts: Vec<String> = map.map(|(key, value)| format!("{key}: {}", value.visit(self))).collect();
        format!("{{{}}}", parts.join(", "))
    }

    fn visit_record(&mut self, record: RecordHandle<'a>) -> String {
        let parts: Vec<String> = record.fields.iter().map(|(key, value)| format!("{key}: {}", value.visit(self))).collect();
        format!("{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedl_lex::Lexer;
    use hedl_par::Parser;
    use hedl_sem::resolve;
    use hedl_traverse::DocumentView;
    use hedl_util::{symbol::Interner, FileId};

    fn parse_doc(src: &str) -> hedl_model::Document {
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, FileId::DUMMY, &mut interner).tokenize().unwrap();
        let ast = Parser::new(tokens, src, &interner).parse().unwrap();
        resolve(ast, interner, true).unwrap()
    }

    #[test]
    fn record_becomes_one_create_statement() {
        let doc = parse_doc("%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrow: Row { a: 1 }\n");
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        let text = to_string(item.value()).unwrap();
        assert_eq!(text, "CREATE (:Row {a: 1})");
    }

    #[test]
    fn matrix_becomes_one_statement_per_row() {
        let doc = parse_doc(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrows: [Row { a: 1 }, Row { a: 2 }]\n",
        );
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        let text = to_string(item.value()).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn bare_scalar_is_rejected() {
        let doc = parse_doc("%VERSION: 1.0\n---\nname: \"solo\"\n");
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        assert!(matches!(to_string(item.value()), Err(RenderError::GraphRequiresRecord)));
    }
}
