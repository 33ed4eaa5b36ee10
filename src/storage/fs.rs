use super::key::{sanitize_bucket, sanitize_key};
use super::{BlobStore, StorageError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Blob store laid out as `<root>/<bucket>/<key>` on the local filesystem
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a bucket/key pair to a path under the root
    pub fn path_for(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let bucket = sanitize_bucket(bucket)?;
        let key = sanitize_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

impl BlobStore for FsBlobStore {
    fn get_blob(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(bucket, key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "read blob");
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn put_blob(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.path_for(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, bytes).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), content_type, "wrote blob");
        Ok(())
    }
}
