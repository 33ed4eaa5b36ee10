use super::{BlobStore, ItemStore, StorageError};
use crate::record::Record;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Blob stored by [`MemoryBlobStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-process blob store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<(String, String), StoredBlob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, as an upload would
    pub fn insert(&self, bucket: &str, key: &str, bytes: impl Into<Vec<u8>>) {
        self.blobs.lock().insert(
            (bucket.to_string(), key.to_string()),
            StoredBlob {
                bytes: bytes.into(),
                content_type: "application/octet-stream".to_string(),
            },
        );
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredBlob> {
        self.blobs
            .lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn get_blob(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.get(bucket, key)
            .map(|blob| blob.bytes)
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn put_blob(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.blobs.lock().insert(
            (bucket.to_string(), key.to_string()),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

/// In-process item store; items whose id appears in `reject_ids` fail to save
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    items: Mutex<Vec<(String, Record)>>,
    reject_ids: Vec<String>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            items: Mutex::default(),
            reject_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Items saved to `table`, in write order
    pub fn items(&self, table: &str) -> Vec<Record> {
        self.items
            .lock()
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, item)| item.clone())
            .collect()
    }
}

impl ItemStore for MemoryItemStore {
    fn put_item(&self, table: &str, item: &Record) -> Result<(), StorageError> {
        let id = item.get("id").and_then(|v| v.as_str()).unwrap_or_default();
        if self.reject_ids.iter().any(|r| r == id) {
            return Err(StorageError::InvalidKey(format!("rejected item id: {}", id)));
        }
        self.items.lock().push((table.to_string(), item.clone()));
        Ok(())
    }
}
