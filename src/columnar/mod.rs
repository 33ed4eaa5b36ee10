#[cfg(feature = "parquet")]
mod parquet_codec;


#[cfg(feature = "parquet")]
pub use parquet_codec::ParquetCodec;

use crate::error::DatasetError;
use crate::record::Record;
use std::sync::Arc;

/// Encoder/decoder for a column-major binary table format.
///
/// Code that needs columnar support holds an `Option<Arc<dyn ColumnarCodec>>` and
/// reports [`DatasetError::CapabilityUnavailable`] when it is `None`.
pub trait ColumnarCodec: Send + Sync {
    /// Short format name used in errors and logs (e.g. "parquet")
    fn name(&self) -> &'static str;

    /// Decode a complete file into records, one per row, keyed by column name
    fn decode(&self, bytes: &[u8]) -> Result<Vec<Record>, DatasetError>;

    /// Encode a non-empty record sequence into a complete file
    fn encode(&self, records: &[Record]) -> Result<Vec<u8>, DatasetError>;
}

/// The codec compiled into this build, if any.
pub fn default_codec() -> Option<Arc<dyn ColumnarCodec>> {
    #[cfg(feature = "parquet")]
    {
        Some(Arc::new(ParquetCodec::default()))
    }
    #[cfg(not(feature = "parquet"))]
    {
        None
    }
}

/// Resolve the codec or fail with the capability error for `format`.
pub fn require(
    codec: Option<&Arc<dyn ColumnarCodec>>,
    format: &'static str,
) -> Result<Arc<dyn ColumnarCodec>, DatasetError> {
    codec
        .cloned()
        .ok_or(DatasetError::CapabilityUnavailable(format))
}
