//! OpenAI-backed provider.
//!
//! One HTTP client, two endpoints: chat-style operations go through
//! `/chat/completions`, raw generation through `/completions`. Sentiment and
//! summarization are chat completions with fixed prompt shapes and pinned
//! temperatures so their cached results stay comparable across calls.

use super::Provider;
use crate::models::ModelRegistry;
use crate::types::{Operation, RequestParams};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`OpenAiProvider`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point at a compatible endpoint (proxies, mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTPS provider speaking the OpenAI completion APIs.
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
    registry: ModelRegistry,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        Self::with_registry(config, ModelRegistry::builtin())
    }

    /// Use a custom registry; the registry's per-model token ceilings bound
    /// every request's `max_tokens`.
    pub fn with_registry(config: OpenAiConfig, registry: ModelRegistry) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            registry,
        })
    }

    fn clamp_max_tokens(&self, model: &str, requested: u32) -> u32 {
        match self.registry.get(model) {
            Some(info) => requested.min(info.max_tokens),
            None => requested,
        }
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::provider(format!("OpenAI API call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::provider(format!(
                "OpenAI API call failed: HTTP {status}: {detail}"
            )));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| Error::provider(format!("OpenAI API returned invalid JSON: {e}")))
    }

    async fn chat_completion(
        &self,
        model: &str,
        content: String,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String> {
        debug!(model, max_tokens, "calling OpenAI chat completion");
        let body = json!({
            "model": model,
            "messages": [{ "role": "user", "content": content }],
            "temperature": temperature,
            "max_tokens": self.clamp_max_tokens(model, max_tokens),
        });
        let response = self.post("chat/completions", body).await?;
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::provider("OpenAI response missing message content"))
    }

    async fn text_completion(
        &self,
        model: &str,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String> {
        debug!(model, "calling OpenAI text generation");
        let body = json!({
            "model": model,
            "prompt": prompt,
            "temperature": temperature,
            "max_tokens": self.clamp_max_tokens(model, max_tokens),
        });
        let response = self.post("completions", body).await?;
        response["choices"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::provider("OpenAI response missing completion text"))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn invoke(
        &self,
        operation: Operation,
        model: &str,
        payload: &str,
        params: &RequestParams,
    ) -> Result<String> {
        let temperature = params.temperature.unwrap_or(0.7);
        match operation {
            Operation::Chat => {
                let max_tokens = params.max_tokens.unwrap_or(500);
                self.chat_completion(model, payload.to_string(), temperature, max_tokens)
                    .await
            }
            Operation::Generate => {
                let max_tokens = params.max_tokens.unwrap_or(300);
                self.text_completion(model, payload, temperature, max_tokens)
                    .await
            }
            Operation::Sentiment => {
                let prompt = format!(
                    "Analyze the sentiment of the following text and respond with only one \
                     word: positive, negative, or neutral.\n\nText: \"{payload}\""
                );
                let out = self.chat_completion(model, prompt, 0.3, 10).await?;
                Ok(out.trim().to_lowercase())
            }
            Operation::Summarize => {
                let max_length = params.max_length.unwrap_or(150);
                let prompt = format!(
                    "Please summarize the following text in about {max_length} characters:\n\n{payload}"
                );
                // Rough character-to-token estimate for the budget.
                let max_tokens = max_length.div_ceil(4);
                self.chat_completion(model, prompt, 0.5, max_tokens).await
            }
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
