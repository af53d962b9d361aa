//! TTL policy: how long a cached result may be reused.

use crate::models::ModelTier;
use crate::types::Operation;
use std::time::Duration;

/// Maps a model tier (and operation) to a cache TTL.
///
/// Premium models cost more to recompute, so their results live longer.
/// Sentiment is pinned to the standard TTL regardless of tier: its output is
/// a single label whose recomputation cost does not scale with the model.
/// TTLs are chosen at write time and never renewed on read.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    standard: Duration,
    premium: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            standard: Duration::from_secs(1800),
            premium: Duration::from_secs(3600),
        }
    }
}

impl TtlPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_standard_ttl(mut self, ttl: Duration) -> Self {
        self.standard = ttl;
        self
    }

    pub fn with_premium_ttl(mut self, ttl: Duration) -> Self {
        self.premium = ttl;
        self
    }

    pub fn ttl_for(&self, operation: Operation, tier: ModelTier) -> Duration {
        match (operation, tier) {
            (Operation::Sentiment, _) => self.standard,
            (_, ModelTier::Premium) => self.premium,
            (_, ModelTier::Standard) => self.standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_models_cache_longer() {
        let policy = TtlPolicy::default();
        assert_eq!(
            policy.ttl_for(Operation::Chat, ModelTier::Premium),
            Duration::from_secs(3600)
        );
        assert_eq!(
            policy.ttl_for(Operation::Chat, ModelTier::Standard),
            Duration::from_secs(1800)
        );
    }

    #[test]
    fn sentiment_is_pinned_to_standard_ttl() {
        let policy = TtlPolicy::default();
        assert_eq!(
            policy.ttl_for(Operation::Sentiment, ModelTier::Premium),
            Duration::from_secs(1800)
        );
    }
}
