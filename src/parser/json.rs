use super::{RecordParser, decode_utf8};
use crate::error::DatasetError;
use crate::record::Record;
use serde_json::Value;
use tracing::info;

const FORMAT: &str = "json";

/// JSON document or JSON-Lines reader
///
/// A top-level array must hold only objects, a top-level object is one record,
/// and anything else is retried line by line as JSON-Lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl RecordParser for JsonParser {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Record>, DatasetError> {
        let text = decode_utf8(FORMAT, bytes)?;

        match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(map) => Ok(map),
                    _ => Err(DatasetError::parse(
                        FORMAT,
                        format!("array element {i} is not an object"),
                    )),
                })
                .collect(),
            Ok(Value::Object(map)) => Ok(vec![map]),
            _ => {
                info!("input is not a single JSON document, reading as JSON Lines");
                parse_lines(text)
            }
        }
    }
}

fn parse_lines(text: &str) -> Result<Vec<Record>, DatasetError> {
    let mut records = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line)
            .map_err(|e| DatasetError::parse(FORMAT, format!("line {}: {e}", i + 1)))?;
        match value {
            Value::Object(map) => records.push(map),
            _ => {
                return Err(DatasetError::parse(
                    FORMAT,
                    format!("line {} is not an object", i + 1),
                ));
            }
        }
    }

    Ok(records)
}
