use super::StorageError;
use std::path::{Component, Path};

/// Normalize an object key or bucket name into a relative path.
///
/// Rejects:
/// - Empty keys
/// - Absolute paths (/etc/passwd)
/// - Parent directory traversal (../)
///
/// `.` components are dropped; hidden names are allowed.
pub fn sanitize_key(raw: &str) -> Result<String, StorageError> {
    if raw.is_empty() {
        return Err(StorageError::InvalidKey("Empty key".to_string()));
    }

    let mut components = Vec::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(StorageError::InvalidKey(format!(
                    "Absolute path not allowed: {}",
                    raw
                )));
            }
            Component::ParentDir => {
                return Err(StorageError::InvalidKey(format!(
                    "Parent directory traversal not allowed: {}",
                    raw
                )));
            }
            Component::CurDir => continue,
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    StorageError::InvalidKey(format!("Invalid UTF-8 in key: {:?}", part))
                })?;
                components.push(part);
            }
        }
    }

    if components.is_empty() {
        return Err(StorageError::InvalidKey(format!(
            "No valid components: {}",
            raw
        )));
    }

    Ok(components.join("/"))
}

/// Bucket names must be a single path component
pub fn sanitize_bucket(raw: &str) -> Result<String, StorageError> {
    let bucket = sanitize_key(raw)?;
    if bucket.contains('/') {
        return Err(StorageError::InvalidKey(format!(
            "Bucket name must not contain '/': {}",
            raw
        )));
    }
    Ok(bucket)
}
