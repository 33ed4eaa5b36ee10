pub mod client;
pub mod error;
pub mod mock;
pub mod retry;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::OpenAiClient;
pub use error::InsightError;
pub use mock::{MockInsightService, MockResponse};
pub use retry::{MAX_RETRIES, RetryPolicy, RetryingService, Sleeper, TokioSleeper};

use async_trait::async_trait;
use std::sync::Arc;

/// Turns a prompt into insight text
#[async_trait]
pub trait InsightService: Send + Sync {
    async fn generate(&self, prompt: &str, system_instruction: &str) -> Result<String, InsightError>;
}

#[async_trait]
impl<T: InsightService + ?Sized> InsightService for Arc<T> {
    async fn generate(&self, prompt: &str, system_instruction: &str) -> Result<String, InsightError> {
        (**self).generate(prompt, system_instruction).await
    }
}
