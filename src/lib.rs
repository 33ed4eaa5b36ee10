// Public API exports
pub mod columnar;
pub mod config;
pub mod error;
pub mod insight;
pub mod parser;
pub mod persist;
pub mod pipeline;
pub mod prompt;
pub mod record;
pub mod resolver;
pub mod serializer;
pub mod storage;

// Re-export main types for convenience
pub use record::{Dataset, Record, record_from_pairs};
pub use error::DatasetError;

pub use columnar::{ColumnarCodec, default_codec};
pub use parser::{ParserRegistry, RaggedRows, RecordParser};
pub use resolver::resolve_text;

pub use prompt::{PackedPrompt, PromptEntry, PromptStrategy, pack_summary};
pub use serializer::{OutputFormat, SerializedOutput, serialize};

pub use insight::{InsightError, InsightService, OpenAiClient, RetryPolicy, RetryingService};

pub use storage::{BlobStore, FsBlobStore, ItemStore, SqliteItemStore, StorageError};
pub use persist::{PersistStats, save_items};

pub use config::{Config, ConfigError, InsightSettings};
pub use pipeline::{Pipeline, PipelineError, PipelineOutcome, UploadEvent};
