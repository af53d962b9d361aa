//! Cache key derivation.
//!
//! Keys are three colon-joined segments: `operation:model:fingerprint`. The
//! fingerprint is a full SHA-256 digest of the payload, hex-encoded, so two
//! payloads that differ anywhere produce different keys while byte-equal
//! payloads always collapse onto the same entry. Keeping operation and model
//! as separate plain segments guarantees keys for different operations or
//! models never collide even if fingerprints did.

use crate::types::Operation;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An opaque, stable cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Derives cache keys from request coordinates.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyBuilder {
    salt: Option<String>,
}

impl CacheKeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mix a salt into every fingerprint, e.g. to invalidate all entries
    /// across a prompt-template change.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// Build the key for one request.
    pub fn build(&self, operation: Operation, model: &str, payload: &str) -> CacheKey {
        let mut hasher = Sha256::new();
        if let Some(ref salt) = self.salt {
            hasher.update(salt.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(payload.as_bytes());
        let fingerprint: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        CacheKey::new(format!("{}:{}:{}", operation.as_str(), model, fingerprint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_coordinates_same_key() {
        let builder = CacheKeyBuilder::new();
        let a = builder.build(Operation::Chat, "gpt-4", "hello");
        let b = builder.build(Operation::Chat, "gpt-4", "hello");
        assert_eq!(a, b);
    }

    #[test]
    fn operation_and_model_segments_keep_keys_distinct() {
        let builder = CacheKeyBuilder::new();
        let chat_a = builder.build(Operation::Chat, "modelA", "hello");
        let gen_a = builder.build(Operation::Generate, "modelA", "hello");
        let chat_b = builder.build(Operation::Chat, "modelB", "hello");
        assert_ne!(chat_a, gen_a);
        assert_ne!(chat_a, chat_b);
        assert_ne!(gen_a, chat_b);
    }

    #[test]
    fn long_shared_prefix_does_not_alias() {
        // The original scheme truncated an encoded payload, aliasing long
        // inputs with a common prefix. A full digest must not.
        let builder = CacheKeyBuilder::new();
        let prefix = "x".repeat(500);
        let a = builder.build(Operation::Generate, "gpt-4", &format!("{prefix}-one"));
        let b = builder.build(Operation::Generate, "gpt-4", &format!("{prefix}-two"));
        assert_ne!(a, b);
    }

    #[test]
    fn key_format_is_three_colon_joined_segments() {
        let key = CacheKeyBuilder::new().build(Operation::Sentiment, "gpt-3.5-turbo", "nice");
        let parts: Vec<&str> = key.as_str().splitn(3, ':').collect();
        assert_eq!(parts[0], "sentiment");
        assert_eq!(parts[1], "gpt-3.5-turbo");
        // hex sha-256
        assert_eq!(parts[2].len(), 64);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn salt_changes_the_fingerprint() {
        let plain = CacheKeyBuilder::new().build(Operation::Chat, "m", "p");
        let salted = CacheKeyBuilder::new()
            .with_salt("v2")
            .build(Operation::Chat, "m", "p");
        assert_ne!(plain, salted);
    }
}
