//! Core type definitions: operations and request parameters.

use serde::{Deserialize, Serialize};

/// Logical AI operation being memoized.
///
/// The operation kind is the first segment of every cache key, so results for
/// different operations over the same model and payload never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Chat,
    Generate,
    Sentiment,
    Summarize,
}

impl Operation {
    /// Stable string form used as a cache key segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Chat => "chat",
            Operation::Generate => "generate",
            Operation::Sentiment => "sentiment",
            Operation::Summarize => "summarize",
        }
    }

    /// Maximum accepted payload length in characters for this operation.
    pub fn max_payload_len(&self) -> usize {
        match self {
            Operation::Chat => 2000,
            Operation::Generate => 5000,
            Operation::Sentiment => 5000,
            Operation::Summarize => 10_000,
        }
    }

    pub fn all() -> &'static [Operation] {
        &[
            Operation::Chat,
            Operation::Generate,
            Operation::Sentiment,
            Operation::Summarize,
        ]
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable request parameters forwarded to the provider.
///
/// Defaults mirror the service surface: temperature 0.7 and a per-operation
/// token budget applied by the provider when `max_tokens` is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RequestParams {
    /// Sampling temperature, accepted range 0.0..=2.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Upper bound on generated tokens; clamped to the model's own ceiling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Target summary length in characters (summarize only), range 50..=1000.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }
}
