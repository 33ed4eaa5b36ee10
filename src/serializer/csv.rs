use crate::error::DatasetError;
use crate::record::Record;
use serde_json::Value;
use std::collections::BTreeSet;

const FORMAT: &str = "csv";

/// CSV with a header of every key seen in any record, sorted.
///
/// Cells for missing keys are empty. An empty dataset produces an empty body.
pub(super) fn to_csv(records: &[Record]) -> Result<Vec<u8>, DatasetError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let columns: Vec<&str> = records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&columns)
        .map_err(|e| DatasetError::serialization(FORMAT, e))?;

    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|c| record.get(*c).map(cell_text).unwrap_or_default())
            .collect();
        writer
            .write_record(&row)
            .map_err(|e| DatasetError::serialization(FORMAT, e))?;
    }

    writer
        .into_inner()
        .map_err(|e| DatasetError::serialization(FORMAT, e))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
