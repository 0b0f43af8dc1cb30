//! JSON emission, via a [`Visitor`] that builds a [`serde_json::Value`]
//! tree and hands it to `serde_json`'s own writer.

use crate::error::RenderResult;
use hedl_traverse::{
    ListHandle, MapHandle, MatrixHandle, RecordHandle, ReferenceHandle, Visitor,
};
use serde_json::{Map, Number, Value as Json};

pub fn to_json_value<'a>(handle: hedl_traverse::ValueHandle<'a>) -> Json {
    let mut visitor = JsonVisitor;
    handle.visit(&mut visitor)
}

pub fn to_string(handle: hedl_traverse::ValueHandle) -> RenderResult<String> {
    Ok(serde_json::to_string(&to_json_value(handle))?)
}

pub fn to_string_pretty(handle: hedl_traverse::ValueHandle) -> RenderResult<String> {
    Ok(serde_json::to_string_pretty(&to_json_value(handle))?)
}

struct JsonVisitor;

impl<'a> Visitor<'a> for JsonVisitor {
    type Output = Json;

    fn visit_null(&mut self) -> Json {
        Json::Null
    }

    fn visit_bool(&mut self, value: bool) -> Json {
        Json::Bool(value)
    }

    fn visit_integer(&mut self, value: i64) -> Json {
        Json::Number(Number::from(value))
    }

    fn visit_float(&mut self, value: f64) -> Json {
        Number::from_f64(value).map(Json::Number).unwrap_or(Json::Null)
    }

    fn visit_string(&mut self, value: &'a str) -> Json {
        Json::String(value.to_string())
    }

    fn visit_reference(&mut self, reference: ReferenceHandle<'a>) -> Json {
        Json::String(format!("@{}", reference.path()))
    }

    fn visit_flat_list(&mut self, list: ListHandle<'a>) -> Json {
        Json::Array(list.map(|item| item.visit(self)).collect())
    }

    fn visit_matrix_list(&mut self, matrix: MatrixHandle<'a>) -> Json {
        let rows = matrix
            .rows
            .iter()
            .map(|row| {
                let mut map = Map::with_capacity(row.len());
                for (key, value) in row.iter() {
                    map.insert(key.to_string(), value.visit(self));
                }
                Json::Object(map)
            })
            .collect();
        Json::Array(rows)
    }

    fn visit_map(&mut self, map: MapHandle<'a>) -> Json {
        let mut out = Map::with_capacity(map.len());
        for (key, value) in map {
            out.insert(key.to_string(), value.visit(self));
        }
        Json::Object(out)
    }

    fn visit_record(&mut self, record: RecordHandle<'a>) -> Json {
        let mut out = Map::with_capacity(record.fields.len());
        for (key, value) in record.fields.iter() {
            out.insert(key.to_string(), value.visit(self));
        }
        Json::Object(out)
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
    fn record_becomes_a_json_object() {
        let doc = parse_doc("%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrow: Row { a: 1 }\n");
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        let json = to_json_value(item.value());
        assert_eq!(json, serde_json::json!({"a": 1}));
    }

    #[test]
    fn matrix_list_becomes_a_json_array_of_objects() {
        let doc = parse_doc(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrows: [Row { a: 1 }, Row { a: 2 }]\n",
        );
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        let json = to_json_value(item.value());
        assert_eq!(json, serde_json::json!([{"a": 1}, {"a": 2}]));
    }
}
