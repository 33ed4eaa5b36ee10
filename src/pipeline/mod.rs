//! Per-upload orchestration: fetch, parse, augment, serialize, store.

mod augment;
mod error;
mod event;


pub use augment::{
    Augmentation, INSIGHT_FIELD, NOTHING_TO_SUMMARIZE, SUMMARY_FIELD, TEXT_NOT_FOUND,
};
pub use error::PipelineError;
pub use event::{BucketRef, EventRecord, ObjectRef, S3Entity, UploadEvent};

use crate::columnar::{self, ColumnarCodec};
use crate::config::Config;
use crate::insight::InsightService;
use crate::parser::ParserRegistry;
use crate::persist::{PersistStats, save_items};
use crate::prompt::{
    PromptStrategy, SYSTEM_INSTRUCTION, pack_summary, per_record_prompt, summary_prompt,
};
use crate::record::Record;
use crate::resolver::resolve_text;
use crate::serializer::{OutputFormat, serialize};
use crate::storage::{BlobStore, ItemStore};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::task;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// The file held no records; nothing was written
    NoData { source_key: String },
    Augmented {
        source_key: String,
        /// `s3://<bucket>/<key>` of the augmented dataset
        output_location: String,
        record_count: usize,
        strategy: PromptStrategy,
        /// Item save counts, when secondary persistence ran
        persisted: Option<PersistStats>,
    },
}

/// Key of the augmented dataset for a given source key
pub fn output_key_for(source_key: &str, format: OutputFormat) -> String {
    let stem = Path::new(source_key)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    format!("augmented_datasets/augmented_{}.{}", stem, format.as_str())
}

pub struct Pipeline {
    config: Config,
    registry: ParserRegistry,
    blobs: Arc<dyn BlobStore>,
    items: Option<Arc<dyn ItemStore>>,
    insight: Arc<dyn InsightService>,
    codec: Option<Arc<dyn ColumnarCodec>>,
}

impl Pipeline {
    /// Wire a pipeline. Fails when Parquet output is requested without a codec.
    pub fn new(
        config: Config,
        blobs: Arc<dyn BlobStore>,
        items: Option<Arc<dyn ItemStore>>,
        insight: Arc<dyn InsightService>,
        codec: Option<Arc<dyn ColumnarCodec>>,
    ) -> Result<Self, PipelineError> {
        if config.output_format == OutputFormat::Parquet {
            columnar::require(codec.as_ref(), OutputFormat::Parquet.as_str())?;
        }
        let registry = ParserRegistry::new(config.csv_ragged_rows, codec.clone());

        Ok(Self {
            config,
            registry,
            blobs,
            items,
            insight,
            codec,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process the object named by `event`
    pub async fn run(&self, event: &UploadEvent) -> Result<PipelineOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        self.process(event)
            .instrument(info_span!("pipeline", run_id = %run_id))
            .await
    }

    async fn process(&self, event: &UploadEvent) -> Result<PipelineOutcome, PipelineError> {
        let (bucket, source_key) = event.source()?;
        info!(bucket, source_key, "processing upload");

        let bytes = self.fetch(bucket, source_key).await.inspect_err(|e| {
            error!(source_key, error = %e, "failed to fetch source object");
        })?;
        let records = self.registry.parse(&bytes, source_key).inspect_err(|e| {
            error!(source_key, error = %e, "failed to parse source object");
        })?;

        if records.is_empty() {
            warn!(source_key, "no data in input file");
            return Ok(PipelineOutcome::NoData {
                source_key: source_key.to_string(),
            });
        }

        let strategy = self.config.strategy;
        let augmented = match strategy {
            PromptStrategy::PerRecord => self.augment_per_record(&records, source_key).await,
            PromptStrategy::SummarizeAll => self.augment_summary(&records, source_key).await,
        };

        let format = self.config.output_format;
        let output = serialize(&augmented, format, self.codec.as_ref()).inspect_err(|e| {
            error!(source_key, error = %e, "failed to serialize augmented dataset");
        })?;

        let output_key = output_key_for(source_key, format);
        let output_bucket = &self.config.output_bucket;
        self.store(output_bucket, &output_key, output.body, output.content_type)
            .await
            .inspect_err(|e| {
                error!(source_key, output_key = %output_key, error = %e, "failed to store augmented dataset");
            })?;
        let output_location = format!("s3://{}/{}", output_bucket, output_key);
        info!(source_key, output_location = %output_location, "augmented dataset saved");

        let record_count = augmented.len();
        let persisted = self.persist(augmented, source_key).await?;

        Ok(PipelineOutcome::Augmented {
            source_key: source_key.to_string(),
            output_location,
            record_count,
            strategy,
            persisted,
        })
    }

    /// One insight per record, requested with bounded concurrency, written back by index
    async fn augment_per_record(&self, records: &[Record], source_key: &str) -> Vec<Record> {
        let concurrency = self.config.insight.concurrency.max(1);
        let results: Vec<Augmentation> = stream::iter(records.iter().enumerate())
            .map(|(index, record)| self.record_insight(index, record, source_key))
            .buffered(concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|a| a.is_error()).count();
        info!(source_key, records = records.len(), failed, "generated per-record insights");

        let field = Augmentation::field(PromptStrategy::PerRecord);
        records
            .iter()
            .zip(&results)
            .map(|(record, augmentation)| {
                with_field(record, field, augmentation.render(PromptStrategy::PerRecord))
            })
            .collect()
    }

    async fn record_insight(&self, index: usize, record: &Record, source_key: &str) -> Augmentation {
        let Some(text) = resolve_text(record, index, &self.config.text_field) else {
            return Augmentation::TextNotFound;
        };

        match self
            .insight
            .generate(&per_record_prompt(text), SYSTEM_INSTRUCTION)
            .await
        {
            Ok(insight) => Augmentation::Insight(insight),
            Err(e) => {
                error!(source_key, index, error = %e, "failed to generate insight for record");
                Augmentation::ServiceError(e)
            }
        }
    }

    /// One insight over the packed leading records, broadcast to every record
    async fn augment_summary(&self, records: &[Record], source_key: &str) -> Vec<Record> {
        let packed = pack_summary(
            records,
            &self.config.text_field,
            self.config.max_records_for_summary,
            self.config.max_chars_for_summary,
        );

        let augmentation = if packed.is_empty() {
            warn!(source_key, "no text found in records to summarize");
            Augmentation::NothingToSummarize
        } else {
            info!(
                source_key,
                entries = packed.entries.len(),
                chars = packed.total_chars,
                truncated = packed.truncated,
                "requesting summary insight"
            );
            match self
                .insight
                .generate(&summary_prompt(&packed.combined_text), SYSTEM_INSTRUCTION)
                .await
            {
                Ok(insight) => Augmentation::Insight(insight),
                Err(e) => {
                    error!(source_key, error = %e, "failed to generate summary insight");
                    Augmentation::ServiceError(e)
                }
            }
        };

        let field = Augmentation::field(PromptStrategy::SummarizeAll);
        let value = augmentation.render(PromptStrategy::SummarizeAll);
        records
            .iter()
            .map(|record| with_field(record, field, value.clone()))
            .collect()
    }

    /// Read the source object on the blocking pool
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, PipelineError> {
        let blobs = Arc::clone(&self.blobs);
        let (bucket, key) = (bucket.to_string(), key.to_string());
        let bytes = task::spawn_blocking(move || blobs.get_blob(&bucket, &key)).await??;
        Ok(bytes)
    }

    /// Write the output object on the blocking pool
    async fn store(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &'static str,
    ) -> Result<(), PipelineError> {
        let blobs = Arc::clone(&self.blobs);
        let (bucket, key) = (bucket.to_string(), key.to_string());
        task::spawn_blocking(move || blobs.put_blob(&bucket, &key, &body, content_type)).await??;
        Ok(())
    }

    async fn persist(
        &self,
        augmented: Vec<Record>,
        source_key: &str,
    ) -> Result<Option<PersistStats>, PipelineError> {
        match (&self.items, &self.config.item_table) {
            (Some(store), Some(table)) => {
                let store = Arc::clone(store);
                let (table, source_key) = (table.clone(), source_key.to_string());
                let stats = task::spawn_blocking(move || {
                    save_items(store.as_ref(), &table, &augmented, &source_key)
                })
                .await?;
                Ok(Some(stats))
            }
            (None, Some(table)) => {
                warn!(table = %table, "item table configured without an item store; skipping item save");
                Ok(None)
            }
            _ => {
                info!("no item table configured; skipping item save");
                Ok(None)
            }
        }
    }
}

/// Copy of `record` with `field` set to `value`
fn with_field(record: &Record, field: &str, value: String) -> Record {
    let mut out = record.clone();
    out.insert(field.to_string(), Value::String(value));
    out
}
