//! Runtime configuration, read once from the environment.


use crate::insight::RetryPolicy;
use crate::parser::RaggedRows;
use crate::prompt::{DEFAULT_MAX_CHARS_FOR_SUMMARY, DEFAULT_MAX_RECORDS_FOR_SUMMARY, PromptStrategy};
use crate::serializer::OutputFormat;
use secrecy::SecretString;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TEXT_FIELD: &str = "text_column";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Settings for the insight service client and its retry wrapper
#[derive(Debug, Clone)]
pub struct InsightSettings {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
    pub retry: RetryPolicy,
    /// Per-record prompts in flight at once
    pub concurrency: usize,
    /// Per-request HTTP timeout
    pub timeout: Duration,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bucket receiving the augmented dataset
    pub output_bucket: String,
    pub output_format: OutputFormat,
    /// Preferred text field for prompts
    pub text_field: String,
    pub strategy: PromptStrategy,
    pub max_chars_for_summary: usize,
    pub max_records_for_summary: usize,
    /// Item table for secondary persistence, if any
    pub item_table: Option<String>,
    pub csv_ragged_rows: RaggedRows,
    pub insight: InsightSettings,
}

impl Config {
    /// Defaults for everything except the output bucket
    pub fn new(output_bucket: impl Into<String>) -> Self {
        Self {
            output_bucket: output_bucket.into(),
            output_format: OutputFormat::default(),
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            strategy: PromptStrategy::default(),
            max_chars_for_summary: DEFAULT_MAX_CHARS_FOR_SUMMARY,
            max_records_for_summary: DEFAULT_MAX_RECORDS_FOR_SUMMARY,
            item_table: None,
            csv_ragged_rows: RaggedRows::default(),
            insight: InsightSettings::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let output_bucket = get("OUTPUT_BUCKET_NAME").ok_or(ConfigError::Missing("OUTPUT_BUCKET_NAME"))?;
        let mut config = Self::new(output_bucket);

        if let Some(v) = get("OUTPUT_FORMAT") {
            config.output_format = parse_var("OUTPUT_FORMAT", &v.to_lowercase())?;
        }
        if let Some(v) = get("TEXT_COLUMN_NAME") {
            config.text_field = v;
        }
        if let Some(v) = get("PROMPT_STRATEGY") {
            config.strategy = parse_var("PROMPT_STRATEGY", &v.to_lowercase())?;
        }
        if let Some(v) = get("MAX_CHARS_FOR_SUMMARY_PROMPT") {
            config.max_chars_for_summary = parse_var("MAX_CHARS_FOR_SUMMARY_PROMPT", &v)?;
        }
        if let Some(v) = get("MAX_RECORDS_FOR_SUMMARY") {
            config.max_records_for_summary = parse_var("MAX_RECORDS_FOR_SUMMARY", &v)?;
        }
        config.item_table = get("DYNAMODB_TABLE_NAME");
        if let Some(v) = get("CSV_RAGGED_ROWS") {
            config.csv_ragged_rows = parse_var("CSV_RAGGED_ROWS", &v.to_lowercase())?;
        }

        let insight = &mut config.insight;
        insight.api_key = get("OPENAI_API_KEY").map(SecretString::from);
        if let Some(v) = get("OPENAI_MODEL") {
            insight.model = v;
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            insight.base_url = v;
        }
        if let Some(v) = get("INSIGHT_MAX_ATTEMPTS") {
            insight.retry.max_attempts = parse_positive("INSIGHT_MAX_ATTEMPTS", &v)?;
        }
        if let Some(v) = get("INSIGHT_INITIAL_BACKOFF_MS") {
            insight.retry.initial_backoff =
                Duration::from_millis(parse_var("INSIGHT_INITIAL_BACKOFF_MS", &v)?);
        }
        if let Some(v) = get("INSIGHT_MAX_BACKOFF_MS") {
            insight.retry.max_backoff = Duration::from_millis(parse_var("INSIGHT_MAX_BACKOFF_MS", &v)?);
        }
        if let Some(v) = get("INSIGHT_CONCURRENCY") {
            insight.concurrency = parse_positive("INSIGHT_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("INSIGHT_TIMEOUT_SECS") {
            insight.timeout = Duration::from_secs(parse_positive("INSIGHT_TIMEOUT_SECS", &v)?);
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}

fn parse_positive<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
{
    let parsed: T = parse_var(var, value)?;
    if parsed == T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
        });
    }
    Ok(parsed)
}
