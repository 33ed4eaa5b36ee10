use crate::config::ConfigError;
use crate::error::DatasetError;
use crate::storage::StorageError;
use thiserror::Error;

/// Failures that abort a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid upload event: {0}")]
    InvalidEvent(String),

    #[error("Blocking storage task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}
