mod csv;
mod json;

#[cfg(test)]
mod tests;

use crate::columnar::{self, ColumnarCodec};
use crate::error::DatasetError;
use crate::record::Record;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Encodings the augmented dataset can be written in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Parquet,
}

impl OutputFormat {
    /// File extension and config name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Parquet => "application/vnd.apache.parquet",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            other => Err(DatasetError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Encoded dataset ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedOutput {
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

/// Encode records in the requested format.
///
/// Parquet needs `codec`; an empty dataset encodes to an empty payload without
/// touching the codec.
pub fn serialize(
    records: &[Record],
    format: OutputFormat,
    codec: Option<&Arc<dyn ColumnarCodec>>,
) -> Result<SerializedOutput, DatasetError> {
    let body = match format {
        OutputFormat::Json => json::to_json(records)?,
        OutputFormat::Csv => csv::to_csv(records)?,
        OutputFormat::Parquet => {
            let codec = columnar::require(codec, format.as_str())?;
            if records.is_empty() {
                Vec::new()
            } else {
                codec.encode(records)?
            }
        }
    };

    Ok(SerializedOutput {
        body,
        content_type: format.content_type(),
    })
}
