//! Object storage and key-value item capabilities, with local adapters.

mod error;
mod fs;
mod key;
mod memory;
mod sqlite;


pub use error::StorageError;
pub use fs::FsBlobStore;
pub use key::{sanitize_bucket, sanitize_key};
pub use memory::{MemoryBlobStore, MemoryItemStore, StoredBlob};
pub use sqlite::SqliteItemStore;

use crate::record::Record;

/// Object storage addressed by bucket and key
pub trait BlobStore: Send + Sync {
    fn get_blob(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    fn put_blob(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError>;
}

/// Key-value table writes
pub trait ItemStore: Send + Sync {
    fn put_item(&self, table: &str, item: &Record) -> Result<(), StorageError>;
}
