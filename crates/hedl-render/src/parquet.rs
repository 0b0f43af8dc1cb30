//! Parquet emission. Requires a matrix-shaped value. Column physical
//! types are inferred from the first non-null value seen in each column,
//! since the traversal API does not expose a field's declared [`FieldType`]
//! the way `hedl-model::Schema` does -- renderers only ever see resolved
//! values.

use std::sync::Arc;

use parquet::basic::{ConvertedType, Repetition, Type as PhysicalType};
use parquet::column::writer::ColumnWriter;
use parquet::data_type::ByteArray;
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::types::Type as SchemaType;

use crate::error::{RenderError, RenderResult};
use hedl_traverse::{
    ListHandle, MapHandle, MatrixHandle, RecordFieldsHandle, RecordHandle, ReferenceHandle, ValueHandle, Visitor,
};

pub fn to_bytes(handle: ValueHandle) -> RenderResult<Vec<u8>> {
    let mut visitor = ParquetVisitor;
    handle.visit(&mut visitor)
}

struct ParquetVisitor;

impl<'a> Visitor<'a> for ParquetVisitor {
    type Output = RenderResult<Vec<u8>>;

    fn visit_null(&mut self) -> Self::Output {
        Err(RenderError::NotMatrix("parquet"))
    }

    fn visit_bool(&mut self, _value: bool) -> Self::Output {
        Err(RenderError::NotMatrix("parquet"))
    }

    fn visit_integer(&mut self, _value: i64) -> Self::Output {
        Err(RenderError::NotMatrix("parquet"))
    }

    fn visit_float(&mut self, _value: f64) -> Self::Output {
        Err(RenderError::NotMatrix("parquet"))
    }

    fn visit_string(&mut self, _value: &'a str) -> Self::Output {
        Err(RenderError::NotMatrix("parquet"))
    }

    fn visit_reference(&mut self, _reference: ReferenceHandle<'a>) -> Self::Output {
        Err(RenderError::NotMatrix("parquet"))
    }

    fn visit_flat_list(&mut self, _list: ListHandle<'a>) -> Self::Output {
        Err(RenderError::NotMatrix("parquet"))
    }

    fn visit_map(&mut self, _map: MapHandle<'a>) -> Self::Output {
        Err(RenderError::NotMatrix("parquet"))
    }

    fn visit_record(&mut self, _record: RecordHandle<'a>) -> Self::Output {
        Err(RenderError::NotMatrix("parquet"))
    }

    fn visit_matrix_list(&mut self, matrix: MatrixHandle<'a>) -> Self::Output {
        write_matrix(&matrix)
    }
}

#[derive(Clone, Copy)]
enum ColumnKind {
    Bool,
    Int64,
    Double,
    Utf8,
}

enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

struct ScalarProbe(Scalar);

impl<'a> Visitor<'a> for ScalarProbe {
    type Output = ();

    fn visit_null(&mut self) {}
    fn visit_bool(&mut self, value: bool) {
        self.0 = Scalar::Bool(value);
    }
    fn visit_integer(&mut self, value: i64) {
        self.0 = Scalar::Int(value);
    }
    fn visit_float(&mut self, value: f64) {
        self.0 = Scalar::Float(value);
    }
    fn visit_string(&mut self, value: &'a str) {
        self.0 = Scalar::Text(value.to_string());
    }
    fn visit_reference(&mut self, reference: ReferenceHandle<'a>) {
        self.0 = Scalar::Text(format!("@{}", reference.path()));
    }
    fn visit_flat_list(&mut self, _list: ListHandle<'a>) {}
    fn visit_matrix_list(&mut self, _matrix: MatrixHandle<'a>) {}
    fn visit_map(&mut self, _map: MapHandle<'a>) {}
    fn visit_record(&mut self, _record: RecordHandle<'a>) {}
}

fn scalar_of(row: &RecordFieldsHandle<'_>, name: &str) -> Scalar {
    match row.get(name) {
        Some(value) => {
            let mut probe = ScalarProbe(Scalar::Text(String::new()));
            value.visit(&mut probe);
            probe.0
        }
        None => Scalar::Text(String::new()),
    }
}

fn classify_column(rows: &[RecordFieldsHandle<'_>], name: &str) -> ColumnKind {
    for row in rows {
        match scalar_of(row, name) {
            Scalar::Bool(_) => return ColumnKind::Bool,
            Scalar::Int(_) => return ColumnKind::Int64,
            Scalar::Float(_) => return ColumnKind::Double,
            Scalar::Text(s) if !s.is_empty() => return ColumnKind::Utf8,
            Scalar::Text(_) => continue,
        }
    }
    ColumnKind::Utf8
}

fn bool_value(row: &RecordFieldsHandle<'_>, name: &str) -> bool {
    matches!(scalar_of(row, name), Scalar::Bool(true))
}

fn int_value(row: &RecordFieldsHandle<'_>, name: &str) -> i64 {
    match scalar_of(row, name) {
        Scalar::Int(i) => i,
        Scalar::Float(f) => f as i64,
        _ => 0,
    }
}

fn float_value(row: &RecordFieldsHandle<'_>, name: &str) -> f64 {
    match scalar_of(row, name) {
        Scalar::Float(f) => f,
        Scalar::Int(i) => i as f64,
        _ => 0.0,
    }
}

fn text_value(row: &RecordFieldsHandle<'_>, name: &str) -> String {
    match scalar_of(row, name) {
        Scalar::Text(s) => s,
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
    }
}

fn write_matrix(matrix: &MatrixHandle<'_>) -> RenderResult<Vec<u8>> {
    let field_names: Vec<String> = matrix.schema.fields().map(|f| f.name().to_string()).collect();
    let kinds: Vec<ColumnKind> = field_names.iter().map(|name| classify_column(&matrix.rows, name)).collect();

    let mut fields = Vec::with_capacity(field_names.len());
    for (name, kind) in field_names.iter().zip(kinds.iter()) {
        let physical = match kind {
            ColumnKind::Bool => PhysicalType::BOOLEAN,
            ColumnKind::Int64 => PhysicalType::INT64,
            ColumnKind::Double => PhysicalType::DOUBLE,
            ColumnKind::Utf8 => PhysicalType::BYTE_ARRAY,
        };
        let mut builder = SchemaType::primitive_type_builder(name, physical).with_repetition(Repetition::REQUIRED);
        if matches!(kind, ColumnKind::Utf8) {
            builder = builder.with_converted_type(ConvertedType::UTF8);
        }
        fields.push(Arc::new(builder.build().map_err(RenderError::Parquet)?));
    }

    let schema = Arc::new(
        SchemaType::group_type_builder("hedl_matrix")
            .with_fields(fields)
            .build()
            .map_err(RenderError::Parquet)?,
    );
    let props = Arc::new(WriterProperties::builder().build());

    let mut writer = SerializedFileWriter::new(Vec::new(), schema, props).map_err(RenderError::Parquet)?;
    let mut row_group_writer = writer.next_row_group().map_err(RenderError::Parquet)?;

    for (name, kind) in field_names.iter().zip(kinds.iter()) {
        let mut column_writer = row_group_writer
            .next_column()
            .map_err(RenderError::Parquet)?
            .ok_or_else(|| RenderError::Parquet(ParquetError::General("matrix has more columns than the writer expected".to_string())))?;
        match column_writer.untyped() {
            ColumnWriter::BoolColumnWriter(w) => {
                let values: Vec<bool> = matrix.rows.iter().map(|row| bool_value(row, name)).collect();
                w.write_batch(&values, None, None).map_err(RenderError::Parquet)?;
            }
            ColumnWriter::Int64ColumnWriter(w) => {
                let values: Vec<i64> = matrix.rows.iter().map(|row| int_value(row, name)).collect();
                w.write_batch(&values, None, None).map_err(RenderError::Parquet)?;
            }
            ColumnWriter::DoubleColumnWriter(w) => {
                let values: Vec<f64> = matrix.rows.iter().map(|row| float_value(row, name)).collect();
                w.write_batch(&values, None, None).map_err(RenderError::Parquet)?;
            }
            ColumnWriter::ByteArrayColumnWriter(w) => {
                let values: Vec<ByteArray> = matrix.rows.iter().map(|row| ByteArray::from(text_value(row, name).into_bytes())).collect();
                w.write_batch(&values, None, None).map_err(RenderError::Parquet)?;
            }
            _ => {}
        }
        column_writer.close().map_err(RenderError::Parquet)?;
    }

    row_group_writer.close().map_err(RenderError::Parquet)?;
    writer.close().map_err(RenderError::Parquet)?;
    writer.into_inner().map_err(RenderError::Parquet)
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
    fn matrix_produces_a_non_empty_parquet_file() {
        let doc = parse_doc(
            "%VERSION: 1.0\n%SCHEMA: Row { a: int, b: string }\n---\nrows: [Row { a: 1, b: \"x\" }, Row { a: 2, b: \"y\" }]\n",
        );
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        let bytes = to_bytes(item.value()).unwrap();
        assert!(bytes.starts_with(b"PAR1"));
        assert!(bytes.ends_with(b"PAR1"));
    }

    #[test]
    fn non_matrix_value_is_rejected() {
        let doc = parse_doc("%VERSION: 1.0\n---\nname: \"solo\"\n");
        let view = DocumentView::new(&doc);
        let item = view.root_items().next().unwrap();
        assert!(matches!(to_bytes(item.value()), Err(RenderError::NotMatrix(_))));
    }
}
