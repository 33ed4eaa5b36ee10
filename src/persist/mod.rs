//! Secondary persistence of augmented records as key-value items.


use crate::record::Record;
use crate::storage::ItemStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// String fields above this many UTF-8 bytes are truncated
pub const MAX_STRING_FIELD_BYTES: usize = 300 * 1024;
/// Characters kept from a truncated string field
pub const TRUNCATED_STRING_CHAR_LIMIT: usize = 100_000;
pub const TRUNCATION_MARKER: &str = "... (truncated)";

const RESERVED_KEYS: [&str; 3] = ["id", "timestamp", "original_file_key"];

/// Outcome of a batch save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistStats {
    pub saved: usize,
    pub failed: usize,
}

/// Item id for the record at `index` of `source_key`
pub fn item_id(source_key: &str, index: usize) -> String {
    format!("{}_{}", source_key.replace('/', "_"), index)
}

/// ISO-8601 UTC with microseconds and a trailing `Z`
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Build the stored item for one augmented record.
///
/// Empty strings and nulls are omitted, oversized strings are truncated, and
/// record fields never overwrite `id`, `timestamp` or `original_file_key`.
pub fn build_item(record: &Record, index: usize, source_key: &str, timestamp: &str) -> Record {
    let id = item_id(source_key, index);
    let mut item = Record::new();
    item.insert("id".to_string(), Value::String(id.clone()));
    item.insert("timestamp".to_string(), Value::String(timestamp.to_string()));
    item.insert(
        "original_file_key".to_string(),
        Value::String(source_key.to_string()),
    );

    for (key, value) in record {
        if RESERVED_KEYS.contains(&key.as_str()) {
            warn!(item_id = %id, field = %key, "record field shadows a reserved item key; skipped");
            continue;
        }

        let value = match value {
            Value::Null => continue,
            Value::String(s) if s.is_empty() => continue,
            Value::String(s) if s.len() > MAX_STRING_FIELD_BYTES => {
                warn!(item_id = %id, field = %key, bytes = s.len(), "truncating large string field");
                let kept: String = s.chars().take(TRUNCATED_STRING_CHAR_LIMIT).collect();
                Value::String(kept + TRUNCATION_MARKER)
            }
            other => other.clone(),
        };
        item.insert(key.clone(), value);
    }

    item
}

/// Save every record as an item in `table`. Failures are counted, never fatal.
pub fn save_items(
    store: &dyn ItemStore,
    table: &str,
    records: &[Record],
    source_key: &str,
) -> PersistStats {
    let timestamp = format_timestamp(Utc::now());
    let mut stats = PersistStats::default();
    info!(table, records = records.len(), "saving records to item table");

    for (index, record) in records.iter().enumerate() {
        let item = build_item(record, index, source_key, &timestamp);
        match store.put_item(table, &item) {
            Ok(()) => {
                stats.saved += 1;
                debug!(index, "saved item");
            }
            Err(e) => {
                stats.failed += 1;
                error!(source_key, index, error = %e, "failed to save item");
            }
        }
    }

    info!(table, saved = stats.saved, failed = stats.failed, "finished saving items");
    stats
}
