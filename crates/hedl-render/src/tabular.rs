//! CSV emission. Requires a matrix-shaped value: a header row of
//! field names followed by one data row per record, in schema order.

use crate::error::{RenderError, RenderResult};
use hedl_traverse::{ListHandle, MapHandle, MatrixHandle, RecordFieldsHandle, RecordHandle, ReferenceHandle, ValueHandle, Visitor};

pub fn to_string(handle: ValueHandle) -> RenderResult<String> {
    let mut visitor = CsvVisitor { writer: csv::Writer::from_writer(Vec::new()) };
    handle.visit(&mut visitor)?;
    let bytes = visitor.writer.into_inner().map_err(|e| RenderError::Csv(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| RenderError::Csv(csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e))))
}

struct CsvVisitor {
    writer: csv::Writer<Vec<u8>>,
}

impl<'a> Visitor<'a> for CsvVisitor {
    type Output = RenderResult<()>;

    fn visit_null(&mut self) -> Self::Output {
        Err(RenderError::NotMatrix("csv"))
    }

    fn visit_bool(&mut self, _value: bool) -> Self::Output {
        Err(RenderError::NotMatrix("csv"))
    }

    fn visit_integer(&mut self, _value: i64) -> Self::Output {
        Err(RenderError::NotMatrix("csv"))
    }

    fn visit_float(&mut self, _value: f64) -> Self::Output {
        Err(RenderError::NotMatrix("csv"))
    }

    fn visit_string(&mut self, _value: &'a str) -> Self::Output {
        Err(RenderError::NotMatrix("csv"))
    }

    fn visit_reference(&mut self, _reference: ReferenceHandle<'a>) -> Self::Output {
        Err(RenderError::NotMatrix("csv"))
    }

    fn visit_flat_list(&mut self, _list: ListHandle<'a>) -> Self::Output {
        Err(RenderError::NotMatrix("csv"))
    }

    fn visit_map(&mut self, _map: MapHandle<'a>) -> Self::Output {
        Err(RenderError::NotMatrix("csv"))
    }

    fn visit_record(&mut self, _record: RecordHandle<'a>) -> Self::Output {
        Err(RenderError::NotMatrix("csv"))
    }

    fn visit_matrix_list(&mut self, matrix: MatrixHandle<'a>) -> Self::Output {
        let header: Vec<String> = matrix.schema.fields().map(|f| f.name().to_string()).collect();
        self.writer.write_record(&header)?;
        for row in &matrix.rows {
            let record: Vec<String> = header.iter().map(|name| field_cell(row, name)).collect();
            self.writer.write_record(&record)?;
        }
        Ok(())
    }
}

fn field_cell(row: &RecordFieldsHandle, name: &str) -> String {
    match row.get(name) {
        Some(value) => cell_text(value),
        None => String::new(),
    }
}

fn cell_text<'a>(value: ValueHandle<'a>) -> String {
    let mut visitor = CellVisitor;
    value.visit(&mut visitor)
}

/// Flattens a non-scalar cell into one string; matrix rows in well-formed
/// documents hold scalar fields, so this only matters for degenerate input.
struct CellVisitor;

impl<'a> Visitor<'a> for CellVisitor {
    type Output = String;

    fn visit_null(&mut self) -> String {
        String::new()
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
        value.to_string()
    }

    fn visit_reference(&mut self, reference: ReferenceHandle<'a>) -> String {
        format!("@{}", reference.path())
    }

    fn visit_flat_list(&mut self, list: ListHandle<'a>) -> String {
        let parts: Vec<String> = list.map(|item| item.visit(self)).collect();
        format!("[{}]", parts.join(";"))
    }

    fn visit_matrix_list(&mut self, matrix: MatrixHandle<'a>) -> String {
        format!("<{} {} rows>", matrix.rows.len(), matrix.schema.name())
    }

    fn visit_map(&mut self, map: MapHandle<'a>) -> String {
        let parts: Vec<String> = map.map(|(k, v)| format!("{}={}", k, v.visit(self))).collect();
        format!("{{{}}}", parts.join(";"))
    }

    fn visit_record(&mut self, record: RecordHandle<'a>) -> String {
        let parts: Vec<String> = record.fields.iter().map(|(k, v)| format!("{}={}", k, v.visit(self))).collect();
        format!("{{{}}}", parts.join(";"))
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
    fn matrix_becomes_header_plus_rows() {
        let doc = parse_doc(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int, b: string }\n---\nrows: [Row { a: 1, b: \"x\" }, Row { a: 2, b: \"y\" }]\n",
        );
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        let text = to_string(item.value()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("a,b"));
        assert_eq!(lines.next(), Some("1,x"));
        assert_eq!(lines.next(), Some("2,y"));
    }

    #[test]
    fn non_matrix_value_is_rejected() {
        let doc = parse_doc("%VERSION: 1.0\n---\nname: \"solo\"\n");
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        assert!(matches!(to_string(item.value()), Err(RenderError::NotMatrix(_))));
    }
}
