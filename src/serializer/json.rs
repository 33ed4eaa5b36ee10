use crate::error::DatasetError;
use crate::record::Record;

/// Pretty-printed JSON array with two-space indentation
pub(super) fn to_json(records: &[Record]) -> Result<Vec<u8>, DatasetError> {
    serde_json::to_vec_pretty(records).map_err(|e| DatasetError::serialization("json", e))
}
