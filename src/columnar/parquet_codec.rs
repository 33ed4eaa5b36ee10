use super::ColumnarCodec;
use crate::error::DatasetError;
use crate::record::Record;
use bytes::Bytes;
use parquet::basic::{Compression, LogicalType, Repetition, Type as PhysicalType};
use parquet::column::writer::ColumnWriter;
use parquet::data_type::ByteArray;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::types::Type;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const FORMAT: &str = "parquet";

/// Parquet adapter over the `parquet` crate's low-level reader and writer.
#[derive(Debug, Clone)]
pub struct ParquetCodec {
    compression: Compression,
}

impl Default for ParquetCodec {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetCodec {
    pub fn uncompressed() -> Self {
        Self {
            compression: Compression::UNCOMPRESSED,
        }
    }
}

/// Physical column type inferred from the values present in a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Int,
    Float,
    Str,
}

#[derive(Debug, Clone)]
struct ColumnSpec {
    name: String,
    kind: ColumnKind,
}

impl ColumnarCodec for ParquetCodec {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<Record>, DatasetError> {
        let reader = SerializedFileReader::new(Bytes::copy_from_slice(bytes))
            .map_err(|e| DatasetError::parse(FORMAT, e))?;
        let rows = reader
            .get_row_iter(None)
            .map_err(|e| DatasetError::parse(FORMAT, e))?;

        let mut records = Vec::new();
        for (index, row) in rows.enumerate() {
            let row = row.map_err(|e| DatasetError::parse(FORMAT, e))?;
            match row.to_json_value() {
                Value::Object(map) => records.push(map),
                other => {
                    return Err(DatasetError::parse(
                        FORMAT,
                        format!("row {index} decoded to non-object value {other}"),
                    ));
                }
            }
        }

        debug!(rows = records.len(), "decoded parquet table");
        Ok(records)
    }

    fn encode(&self, records: &[Record]) -> Result<Vec<u8>, DatasetError> {
        let specs = infer_columns(records);
        if specs.is_empty() {
            return Err(DatasetError::serialization(
                FORMAT,
                "records carry no fields to build a schema from",
            ));
        }

        let schema = build_schema(&specs)?;
        let props = Arc::new(
            WriterProperties::builder()
                .set_compression(self.compression)
                .build(),
        );

        let mut buf = Vec::new();
        let mut writer = SerializedFileWriter::new(&mut buf, schema, props)
            .map_err(|e| DatasetError::serialization(FORMAT, e))?;
        let mut row_group = writer
            .next_row_group()
            .map_err(|e| DatasetError::serialization(FORMAT, e))?;

        for spec in &specs {
            let Some(mut column) = row_group
                .next_column()
                .map_err(|e| DatasetError::serialization(FORMAT, e))?
            else {
                break;
            };
            write_column(column.untyped(), spec, records)?;
            column
                .close()
                .map_err(|e| DatasetError::serialization(FORMAT, e))?;
        }

        row_group
            .close()
            .map_err(|e| DatasetError::serialization(FORMAT, e))?;
        writer
            .close()
            .map_err(|e| DatasetError::serialization(FORMAT, e))?;

        Ok(buf)
    }
}

/// Union of keys in first-seen order, each typed by the values it holds.
///
/// A column mixing kinds, or holding nested values, falls back to a string
/// column carrying compact JSON.
fn infer_columns(records: &[Record]) -> Vec<ColumnSpec> {
    let mut names: Vec<&String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !names.contains(&key) {
                names.push(key);
            }
        }
    }

    names
        .into_iter()
        .map(|name| {
            let (mut saw_bool, mut saw_int, mut saw_float, mut saw_str) =
                (false, false, false, false);
            for value in records.iter().filter_map(|r| r.get(name)) {
                match value {
                    Value::Null => {}
                    Value::Bool(_) => saw_bool = true,
                    Value::Number(n) if n.is_i64() => saw_int = true,
                    Value::Number(_) => saw_float = true,
                    _ => saw_str = true,
                }
            }

            let kind = if saw_str || (saw_bool && (saw_int || saw_float)) {
                ColumnKind::Str
            } else if saw_float {
                ColumnKind::Float
            } else if saw_int {
                ColumnKind::Int
            } else if saw_bool {
                ColumnKind::Bool
            } else {
                ColumnKind::Str
            };

            ColumnSpec {
                name: name.clone(),
                kind,
            }
        })
        .collect()
}

fn build_schema(specs: &[ColumnSpec]) -> Result<Arc<Type>, DatasetError> {
    let mut fields = Vec::with_capacity(specs.len());
    for spec in specs {
        let physical = match spec.kind {
            ColumnKind::Bool => PhysicalType::BOOLEAN,
            ColumnKind::Int => PhysicalType::INT64,
            ColumnKind::Float => PhysicalType::DOUBLE,
            ColumnKind::Str => PhysicalType::BYTE_ARRAY,
        };
        let mut builder = Type::primitive_type_builder(&spec.name, physical)
            .with_repetition(Repetition::OPTIONAL);
        if spec.kind == ColumnKind::Str {
            builder = builder.with_logical_type(Some(LogicalType::String));
        }
        let field = builder
            .build()
            .map_err(|e| DatasetError::serialization(FORMAT, e))?;
        fields.push(Arc::new(field));
    }

    let schema = Type::group_type_builder("dataset")
        .with_fields(fields)
        .build()
        .map_err(|e| DatasetError::serialization(FORMAT, e))?;
    Ok(Arc::new(schema))
}

/// Write one optional column; absent and null cells get definition level 0.
fn write_column(
    writer: &mut ColumnWriter<'_>,
    spec: &ColumnSpec,
    records: &[Record],
) -> Result<(), DatasetError> {
    let cells: Vec<Option<&Value>> = records
        .iter()
        .map(|r| r.get(&spec.name).filter(|v| !v.is_null()))
        .collect();
    let defs: Vec<i16> = cells.iter().map(|c| i16::from(c.is_some())).collect();

    let written = match (writer, spec.kind) {
        (ColumnWriter::BoolColumnWriter(typed), ColumnKind::Bool) => {
            let values: Vec<bool> = cells.iter().flatten().filter_map(|v| v.as_bool()).collect();
            typed.write_batch(&values, Some(&defs), None)
        }
        (ColumnWriter::Int64ColumnWriter(typed), ColumnKind::Int) => {
            let values: Vec<i64> = cells.iter().flatten().filter_map(|v| v.as_i64()).collect();
            typed.write_batch(&values, Some(&defs), None)
        }
        (ColumnWriter::DoubleColumnWriter(typed), ColumnKind::Float) => {
            let values: Vec<f64> = cells.iter().flatten().filter_map(|v| v.as_f64()).collect();
            typed.write_batch(&values, Some(&defs), None)
        }
        (ColumnWriter::ByteArrayColumnWriter(typed), ColumnKind::Str) => {
            let values: Vec<ByteArray> = cells
                .iter()
                .flatten()
                .map(|v| match v {
                    Value::String(s) => ByteArray::from(s.as_str()),
                    other => ByteArray::from(other.to_string().into_bytes()),
                })
                .collect();
            typed.write_batch(&values, Some(&defs), None)
        }
        _ => {
            return Err(DatasetError::serialization(
                FORMAT,
                format!("column '{}' writer does not match inferred type", spec.name),
            ));
        }
    };

    written.map_err(|e| DatasetError::serialization(FORMAT, e))?;
    Ok(())
}
