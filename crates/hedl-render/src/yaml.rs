//! YAML emission, built the same way as [`crate::json`]: a [`Visitor`]
//! produces a `serde_yaml::Value` tree that `serde_yaml` then serializes.

use crate::error::RenderResult;
use hedl_traverse::{ListHandle, MapHandle, MatrixHandle, RecordHandle, ReferenceHandle, ValueHandle, Visitor};
use serde_yaml::{Mapping, Value as Yaml};

pub fn to_yaml_value<'a>(handle: ValueHandle<'a>) -> Yaml {
    let mut visitor = YamlVisitor;
    handle.visit(&mut visitor)
}

pub fn to_string(handle: ValueHandle) -> RenderResult<String> {
    Ok(serde_yaml::to_string(&to_yaml_value(handle))?)
}

struct YamlVisitor;

impl<'a> Visitor<'a> for YamlVisitor {
    type Output = Yaml;

    fn visit_null(&mut self) -> Yaml {
        Yaml::Null
    }

    fn visit_bool(&mut self, value: bool) -> Yaml {
        Yaml::Bool(value)
    }

    fn visit_integer(&mut self, value: i64) -> Yaml {
        Yaml::Number(value.into())
    }

    fn visit_float(&mut self, value: f64) -> Yaml {
        Yaml::Number(value.into())
    }

    fn visit_string(&mut self, value: &'a str) -> Yaml {
        Yaml::String(value.to_string())
    }

    fn visit_reference(&mut self, reference: ReferenceHandle<'a>) -> Yaml {
        Yaml::String(format!("@{}", reference.path()))
    }

    fn visit_flat_list(&mut self, list: ListHandle<'a>) -> Yaml {
        Yaml::Sequence(list.map(|item| item.visit(self)).collect())
    }

    fn visit_matrix_list(&mut self, matrix: MatrixHandle<'a>) -> Yaml {
        let rows = matrix
            .rows
            .iter()
            .map(|row| {
                let mut mapping = Mapping::with_capacity(row.len());
                for (key, value) in row.iter() {
                    mapping.insert(Yaml::String(key.to_string()), value.visit(self));
                }
                Yaml::Mapping(mapping)
            })
            .collect();
        Yaml::Sequence(rows)
    }

    fn visit_map(&mut self, map: MapHandle<'a>) -> Yaml {
        let mut mapping = Mapping::with_capacity(map.len());
        for (key, value) in map {
            mapping.insert(Yaml::String(key.to_string()), value.visit(self));
        }
        Yaml::Mapping(mapping)
    }

    fn visit_record(&mut self, record: RecordHandle<'a>) -> Yaml {
        let mut mapping = Mapping::with_capacity(record.fields.len());
        for (key, value) in record.fields.iter() {
            mapping.insert(Yaml::String(key.to_string()), value.visit(self));
        }
        Yaml::Mapping(mapping)
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

    #[test]
    fn record_round_trips_through_yaml_text() {
        let mut interner = Interner::new();
        let src = "%VERSION: 1.0\n%SCHEMA: Row { a: int }\n---\nrow: Row { a: 1 }\n";
        let tokens = Lexer::new(src, FileId::DUMMY, &mut interner).tokenize().unwrap();
        let ast = Parser::new(tokens, src, &interner).parse().unwrap();
        let doc = resolve(ast, interner, true).unwrap();
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        let text = to_string(item.value()).unwrap();
        assert!(text.contains("a: 1"));
    }
}
