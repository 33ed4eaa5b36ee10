use super::{ColumnarParser, CsvParser, JsonParser, RaggedRows, RecordParser, TextParser};
use crate::columnar::ColumnarCodec;
use crate::error::DatasetError;
use crate::record::Record;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Dynamic dispatch table from file extension to parser
pub struct ParserRegistry {
    /// Extension (lower-case, no dot) -> Parser mapping
    map: HashMap<String, Arc<dyn RecordParser>>,
}

impl ParserRegistry {
    /// Create an empty registry with no formats
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Create a registry with every built-in format
    ///
    /// `csv`, `json` (also `jsonl` and `ndjson`), `txt` and `parquet` are registered.
    /// Parquet is always registered so that a missing codec reports a capability
    /// error instead of an unsupported extension.
    pub fn new(ragged_rows: RaggedRows, codec: Option<Arc<dyn ColumnarCodec>>) -> Self {
        let mut registry = Self::empty();
        let json: Arc<dyn RecordParser> = Arc::new(JsonParser);

        registry.register("csv", CsvParser::new(ragged_rows));
        registry.register_shared("json", json.clone());
        registry.register_shared("jsonl", json.clone());
        registry.register_shared("ndjson", json);
        registry.register("txt", TextParser);
        registry.register("parquet", ColumnarParser::new("parquet", codec));
        registry
    }

    /// Register a parser for a specific file extension
    ///
    /// # Example
    /// ```ignore
    /// registry.register("tsv", TsvParser::new());
    /// ```
    pub fn register(&mut self, extension: impl Into<String>, parser: impl RecordParser + 'static) {
        self.register_shared(extension, Arc::new(parser));
    }

    /// Register an already shared parser under another extension
    pub fn register_shared(&mut self, extension: impl Into<String>, parser: Arc<dyn RecordParser>) {
        self.map.insert(extension.into().to_lowercase(), parser);
    }

    /// Select the parser for a given object key, if its extension is known
    pub fn select(&self, type_hint: &str) -> Option<&dyn RecordParser> {
        self.map.get(&extension_of(type_hint)).map(|p| &**p)
    }

    /// Parse a whole file, dispatching on the extension of `type_hint`
    ///
    /// Empty input yields no records regardless of extension.
    pub fn parse(&self, bytes: &[u8], type_hint: &str) -> Result<Vec<Record>, DatasetError> {
        if bytes.is_empty() {
            warn!(key = type_hint, "input is empty, no records produced");
            return Ok(Vec::new());
        }

        let extension = extension_of(type_hint);
        let parser = self
            .select(type_hint)
            .ok_or_else(|| DatasetError::UnsupportedFormat(extension.clone()))?;

        info!(key = type_hint, format = parser.format(), "parsing input");
        let records = parser.parse(bytes)?;
        info!(
            key = type_hint,
            format = parser.format(),
            records = records.len(),
            "parsed input"
        );
        Ok(records)
    }

    /// Get the number of registered extensions
    pub fn parser_count(&self) -> usize {
        self.map.len()
    }

    /// List all registered extensions
    pub fn registered_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.map.keys().map(|s| s.as_str()).collect();
        extensions.sort_unstable();
        extensions
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new(RaggedRows::default(), crate::columnar::default_codec())
    }
}

/// Lower-cased text after the last `.` of the key's final segment.
///
/// A dot-file such as `uploads/.csv` has extension `csv`.
fn extension_of(type_hint: &str) -> String {
    let name = type_hint.rsplit('/').next().unwrap_or(type_hint);
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}
