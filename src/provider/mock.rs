//! Deterministic mock provider for tests and offline development.

use super::Provider;
use crate::types::{Operation, RequestParams};
use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Canned-response provider.
///
/// Responses are pure functions of the request, so repeated invocations are
/// byte-identical — exactly what memoization tests need. An invocation
/// counter lets tests assert how many calls actually reached the "provider".
#[derive(Debug, Default)]
pub struct MockProvider {
    invocations: AtomicU64,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of invoke calls that reached this provider.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    fn sentiment_for(payload: &str) -> &'static str {
        // Deterministic pick so identical payloads agree across calls.
        let sum: u64 = payload.bytes().map(u64::from).sum();
        match sum % 3 {
            0 => "positive",
            1 => "negative",
            _ => "neutral",
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn invoke(
        &self,
        operation: Operation,
        model: &str,
        payload: &str,
        _params: &RequestParams,
    ) -> Result<String> {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        debug!(%operation, model, "mock provider invoked");
        let response = match operation {
            Operation::Chat => {
                format!("Mock response for: {payload} [Generated with {model} - Mock Mode]")
            }
            Operation::Generate => {
                format!("Mock generated text for: {payload} [Generated with {model} - Mock Mode]")
            }
            Operation::Sentiment => Self::sentiment_for(payload).to_string(),
            Operation::Summarize => {
                let head: String = payload.chars().take(100).collect();
                format!(
                    "Mock summary for text of length {}. Original: {head}...",
                    payload.chars().count()
                )
            }
        };
        Ok(response)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
