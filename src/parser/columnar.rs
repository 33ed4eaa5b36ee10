use super::RecordParser;
use crate::columnar::{self, ColumnarCodec};
use crate::error::DatasetError;
use crate::record::Record;
use std::sync::Arc;

/// Parser backed by an optional columnar codec
///
/// Without a codec every parse fails with [`DatasetError::CapabilityUnavailable`].
pub struct ColumnarParser {
    format: &'static str,
    codec: Option<Arc<dyn ColumnarCodec>>,
}

impl ColumnarParser {
    pub fn new(format: &'static str, codec: Option<Arc<dyn ColumnarCodec>>) -> Self {
        Self { format, codec }
    }
}

impl RecordParser for ColumnarParser {
    fn format(&self) -> &'static str {
        self.format
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<Record>, DatasetError> {
        columnar::require(self.codec.as_ref(), self.format)?.decode(bytes)
    }
}
