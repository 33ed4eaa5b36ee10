use serde_json::{Map, Value};

/// One logical row of a dataset.
///
/// Backed by `serde_json::Map` with `preserve_order`, so field iteration follows
/// insertion order. Text-field fallback and Parquet column order depend on it.
pub type Record = Map<String, Value>;

/// An ordered sequence of records. The index is the only correlation key.
pub type Dataset = Vec<Record>;

/// Build a record from `(key, value)` pairs, keeping their order.
pub fn record_from_pairs<K, I>(pairs: I) -> Record
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
