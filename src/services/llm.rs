use crate::config::LlmSettings;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the LLM API
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Chat-completions client
///
/// Talks to any OpenAI-compatible endpoint (DeepSeek by default). One call
/// per question; failures surface to the caller without retries - the
/// request timeout is the only safeguard.
pub struct LlmClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client from settings
    pub fn new(settings: &LlmSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            client,
        }
    }

    /// Send one chat request and return the assistant message content
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": self.temperature,
            "response_format": {"type": "json_object"}
        });

        tracing::debug!("Calling LLM API, model: {}", self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("LLM API returned {}: {}", status, body);
            return Err(LlmError::ApiError(format!(
                "LLM API returned {}: {}",
                status, body
            )));
        }

        let json: Value = response.json().await?;

        let content = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                LlmError::InvalidResponse("missing choices[0].message.content".to_string())
            })?;

        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse("empty message content".to_string()));
        }

        Ok(content.trim().to_string())
    }
}
