use super::InsightService;
use super::error::InsightError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Pre-programmed outcome for one call
pub enum MockResponse {
    Text(String),
    Error(InsightError),
}

impl MockResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Insight service for tests and offline runs, no network involved.
///
/// Scripted responses are served in order; once they run out, every call
/// answers with a short digest of the prompt.
pub struct MockInsightService {
    script: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl MockInsightService {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Mock that always echoes
    pub fn echo() -> Self {
        Self::new(Vec::new())
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl InsightService for MockInsightService {
    async fn generate(&self, prompt: &str, _system_instruction: &str) -> Result<String, InsightError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.prompts.lock().push(prompt.to_string());

        let next = self.script.lock().pop_front();
        match next {
            Some(MockResponse::Text(text)) => Ok(text),
            Some(MockResponse::Error(e)) => Err(e),
            None => Ok(format!("insight ({} chars of input)", prompt.chars().count())),
        }
    }
}
