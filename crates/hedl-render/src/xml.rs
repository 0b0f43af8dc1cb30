//! XML emission via `quick-xml`'s streaming [`Writer`]. Containers write
//! their own child elements; scalars write only the text inside whatever
//! element the caller already opened.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{RenderError, RenderResult};
use hedl_traverse::{ListHandle, MapHandle, MatrixHandle, RecordHandle, ReferenceHandle, ValueHandle, Visitor};

fn xml_err(e: quick_xml::Error) -> RenderError {
    RenderError::Xml(e.to_string())
}

/// Renders `handle` as the sole child of an element named `root_name`.
pub fn to_string(root_name: &str, handle: ValueHandle) -> RenderResult<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Start(BytesStart::new(root_name))).map_err(xml_err)?;
    {
        let mut visitor = XmlVisitor { writer: &mut writer };
        handle.visit(&mut visitor)?;
    }
    writer.write_event(Event::End(BytesEnd::new(root_name))).map_err(xml_err)?;
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| RenderError::Xml(e.to_string()))
}

struct XmlVisitor<'w> {
    writer: &'w mut Writer<Cursor<Vec<u8>>>,
}

impl<'w> XmlVisitor<'w> {
    fn start(&mut self, name: &str) -> RenderResult<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name))).map_err(xml_err)
    }

    fn end(&mut self, name: &str) -> RenderResult<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name))).map_err(xml_err)
    }

    fn write_text(&mut self, text: &str) -> RenderResult<()> {
        self.writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_err)
    }

    fn write_child<'a>(&mut self, name: &str, handle: ValueHandle<'a>) -> RenderResult<()> {
        self.start(name)?;
        handle.visit(self)?;
        self.end(name)
    }
}

impl<'a, 'w> Visitor<'a> for XmlVisitor<'w> {
    type Output = RenderResult<()>;

    fn visit_null(&mut self) -> Self::Output {
        Ok(())
    }

    fn visit_bool(&mut self, value: bool) -> Self::Output {
        self.write_text(if value { "true" } else { "false" })
    }

    fn visit_integer(&mut self, value: i64) -> Self::Output {
        self.write_text(&value.to_string())
    }

    fn visit_float(&mut self, value: f64) -> Self::Output {
        self.write_text(&value.to_string())
    }

    fn visit_string(&mut self, value: &'a str) -> Self::Output {
        self.write_text(value)
    }

    fn visit_reference(&mut self, reference: ReferenceHandle<'a>) -> Self::Output {
        self.write_text(&format!("@{}", reference.path()))
    }

    fn visit_flat_list(&mut self, list: ListHandle<'a>) -> Self::Output {
        for item in list {
            self.write_child("item", item)?;
        }
        Ok(())
    }

    fn visit_matrix_list(&mut self, matrix: MatrixHandle<'a>) -> Self::Output {
        let schema_name = matrix.schema.name().to_string();
        for row in &matrix.rows {
            self.start(&schema_name)?;
            for (key, value) in row.iter() {
                self.write_child(key, value)?;
            }
            self.end(&schema_name)?;
        }
        Ok(())
    }

    fn visit_map(&mut self, map: MapHandle<'a>) -> Self::Output {
        for (key, value) in map {
            self.write_child(key, value)?;
        }
        Ok(())
    }

    fn visit_record(&mut self, record: RecordHandle<'a>) -> Self::Output {
        for (key, value) in record.fields.iter() {
            self.write_child(key, value)?;
        }
        Ok(())
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
    fn record_becomes_nested_elements() {
        let doc = parse_doc("%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrow: Row { a: 1 }\n");
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        let text = to_string("row", item.value()).unwrap();
        assert!(text.contains("<a>1</a>"));
        assert!(text.starts_with("<row>"));
        assert!(text.ends_with("</row>"));
    }

    #[test]
    fn matrix_rows_become_repeated_schema_elements() {
        let doc = parse_doc(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrows: [Row { a: 1 }, Row { a: 2 }]\n",
        );
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        let text = to_string("rows", item.value()).unwrap();
        assert_eq!(text.matches("<Row>").count(), 2);
    }
}
