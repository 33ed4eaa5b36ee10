mod columnar;
mod csv;
mod json;
mod registry;
mod text;


pub use self::columnar::ColumnarParser;
pub use self::csv::{CsvParser, RaggedRows};
pub use self::json::JsonParser;
pub use self::text::TextParser;
pub use registry::ParserRegistry;

use crate::error::DatasetError;
use crate::record::Record;

/// Core trait that all format parsers implement
pub trait RecordParser: Send + Sync {
    /// Short format name used in errors and logs
    fn format(&self) -> &'static str;

    /// Decode a complete, non-empty file into records in source order
    ///
    /// # Arguments
    /// * `bytes` - Raw file contents
    ///
    /// # Returns
    /// One record per row/line, or a fatal error for the whole file
    fn parse(&self, bytes: &[u8]) -> Result<Vec<Record>, DatasetError>;
}

/// Decode bytes as UTF-8, reporting failure as a parse error for `format`
fn decode_utf8<'a>(format: &'static str, bytes: &'a [u8]) -> Result<&'a str, DatasetError> {
    std::str::from_utf8(bytes).map_err(|e| DatasetError::parse(format, e))
}
