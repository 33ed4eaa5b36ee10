use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Item store error: {0:#}")]
    Sqlite(anyhow::Error),

    #[error("Failed to encode item: {0}")]
    Encode(#[from] serde_json::Error),
}
