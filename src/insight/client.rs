use super::InsightService;
use super::error::InsightError;
use super::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::config::InsightSettings;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

/// HTTP client for an OpenAI-compatible chat-completions endpoint
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl OpenAiClient {
    pub fn new(settings: &InsightSettings) -> Result<Self, InsightError> {
        let api_key = settings
            .api_key
            .as_ref()
            .map(|key| SecretString::from(key.expose_secret().to_owned()))
            .ok_or_else(|| InsightError::NotConfigured("OPENAI_API_KEY is not set".into()))?;

        let http = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl InsightService for OpenAiClient {
    async fn generate(&self, prompt: &str, system_instruction: &str) -> Result<String, InsightError> {
        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        info!(
            model = %self.model,
            prompt = %preview(prompt),
            "sending prompt to insight service"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InsightError::from_status(status.as_u16(), body));
        }

        let res: ChatResponse = response.json().await?;
        let insight = res.first_text().ok_or_else(|| {
            InsightError::InvalidResponse("response did not contain a message".into())
        })?;

        debug!(insight = %preview(&insight), "received insight");
        Ok(insight)
    }
}

/// First 100 characters of `text`, for logs
fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(100).collect();
    if out.len() < text.len() {
        out.push_str("...");
    }
    out
}
