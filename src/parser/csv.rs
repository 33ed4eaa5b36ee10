use super::{RecordParser, decode_utf8};
use crate::error::DatasetError;
use crate::record::Record;
use serde_json::Value;
use std::str::FromStr;

const FORMAT: &str = "csv";

/// How rows whose cell count differs from the header are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RaggedRows {
    /// Pad missing trailing fields with empty text, drop extra cells
    #[default]
    Lenient,
    /// Reject the whole file
    Strict,
}

impl FromStr for RaggedRows {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(other.to_string()),
        }
    }
}

/// Header-keyed CSV reader; every cell stays text
#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    ragged_rows: RaggedRows,
}

impl CsvParser {
    pub fn new(ragged_rows: RaggedRows) -> Self {
        Self { ragged_rows }
    }
}

impl RecordParser for CsvParser {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Record>, DatasetError> {
        let text = decode_utf8(FORMAT, bytes)?;
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| DatasetError::parse(FORMAT, e))?
            .clone();

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row.map_err(|e| DatasetError::parse(FORMAT, e))?;

            if row.len() != headers.len() && self.ragged_rows == RaggedRows::Strict {
                return Err(DatasetError::parse(
                    FORMAT,
                    format!(
                        "row {} has {} cells, header has {}",
                        index + 1,
                        row.len(),
                        headers.len()
                    ),
                ));
            }

            let record: Record = headers
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let cell = row.get(i).unwrap_or_default();
                    (name.to_string(), Value::String(cell.to_string()))
                })
                .collect();
            records.push(record);
        }

        Ok(records)
    }
}
