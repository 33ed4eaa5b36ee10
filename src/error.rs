use thiserror::Error;

/// Structural failures while decoding or encoding a dataset.
///
/// All variants are fatal for the file being processed.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to parse {format} input: {reason}")]
    Parse { format: &'static str, reason: String },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0} support is not available in this build")]
    CapabilityUnavailable(&'static str),

    #[error("failed to serialize {format} output: {reason}")]
    Serialization { format: &'static str, reason: String },
}

impl DatasetError {
    pub fn parse(format: &'static str, reason: impl ToString) -> Self {
        Self::Parse {
            format,
            reason: reason.to_string(),
        }
    }

    pub fn serialization(format: &'static str, reason: impl ToString) -> Self {
        Self::Serialization {
            format,
            reason: reason.to_string(),
        }
    }
}
