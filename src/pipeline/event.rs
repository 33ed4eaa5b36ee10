use super::PipelineError;
use serde::{Deserialize, Serialize};

/// Object-storage upload notification; only the first record is processed.
///
/// ```json
/// {"Records": [{"s3": {"bucket": {"name": "inbox"}, "object": {"key": "data.csv"}}}]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

impl UploadEvent {
    pub fn from_json(bytes: &[u8]) -> Result<Self, PipelineError> {
        serde_json::from_slice(bytes).map_err(|e| PipelineError::InvalidEvent(e.to_string()))
    }

    /// Event for a single uploaded object
    pub fn single(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            records: vec![EventRecord {
                s3: S3Entity {
                    bucket: BucketRef { name: bucket.into() },
                    object: ObjectRef { key: key.into() },
                },
            }],
        }
    }

    /// Bucket and key of the object to process
    pub fn source(&self) -> Result<(&str, &str), PipelineError> {
        let record = self
            .records
            .first()
            .ok_or_else(|| PipelineError::InvalidEvent("event has no records".to_string()))?;
        Ok((&record.s3.bucket.name, &record.s3.object.key))
    }
}
