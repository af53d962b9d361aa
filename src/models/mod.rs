//! Model catalog and tier registry.
//!
//! The registry answers three questions for the invoker: is this model id
//! known, which pricing tier does it belong to (tier drives the cache TTL),
//! and what is the default model when the caller does not pick one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pricing/capability tier of a model.
///
/// Premium models are more expensive to recompute, so their cached results
/// live longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Standard,
    Premium,
}

/// Static description of one model in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub max_tokens: u32,
    pub context_window: u32,
    pub description: String,
    pub tier: ModelTier,
}

impl ModelInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        max_tokens: u32,
        context_window: u32,
        description: impl Into<String>,
        tier: ModelTier,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_tokens,
            context_window,
            description: description.into(),
            tier,
        }
    }
}

/// Registry of recognized models.
///
/// Lookups are by exact id. The built-in catalog covers the OpenAI chat
/// models; tests and embedders can extend it via [`ModelRegistry::with_model`].
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: HashMap<String, ModelInfo>,
    default_id: String,
}

impl ModelRegistry {
    /// Registry with the built-in catalog and `gpt-3.5-turbo` as default.
    pub fn builtin() -> Self {
        let catalog = [
            ModelInfo::new(
                "gpt-3.5-turbo",
                "GPT-3.5 Turbo",
                4096,
                16_385,
                "Fast, efficient model for most tasks",
                ModelTier::Standard,
            ),
            ModelInfo::new(
                "gpt-3.5-turbo-16k",
                "GPT-3.5 Turbo 16K",
                16_384,
                16_385,
                "GPT-3.5 Turbo with larger context window",
                ModelTier::Standard,
            ),
            ModelInfo::new(
                "gpt-4",
                "GPT-4",
                8192,
                8192,
                "More capable model for complex tasks",
                ModelTier::Premium,
            ),
            ModelInfo::new(
                "gpt-4-turbo-preview",
                "GPT-4 Turbo",
                4096,
                128_000,
                "Latest GPT-4 Turbo with large context window",
                ModelTier::Premium,
            ),
            ModelInfo::new(
                "gpt-4-32k",
                "GPT-4 32K",
                32_768,
                32_768,
                "GPT-4 with extended context window",
                ModelTier::Premium,
            ),
        ];
        let mut models = HashMap::new();
        for info in catalog {
            models.insert(info.id.clone(), info);
        }
        Self {
            models,
            default_id: "gpt-3.5-turbo".to_string(),
        }
    }

    /// Empty registry; callers must register models and a default themselves.
    pub fn empty(default_id: impl Into<String>) -> Self {
        Self {
            models: HashMap::new(),
            default_id: default_id.into(),
        }
    }

    /// Register (or replace) a model.
    pub fn with_model(mut self, info: ModelInfo) -> Self {
        self.models.insert(info.id.clone(), info);
        self
    }

    /// Change the default model id.
    pub fn with_default(mut self, id: impl Into<String>) -> Self {
        self.default_id = id.into();
        self
    }

    pub fn is_valid(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ModelInfo> {
        self.models.get(id)
    }

    /// Tier of a known model; `None` for unrecognized ids.
    pub fn tier(&self, id: &str) -> Option<ModelTier> {
        self.models.get(id).map(|m| m.tier)
    }

    pub fn default_model(&self) -> &str {
        &self.default_id
    }

    /// All registered models, sorted by id for stable listings.
    pub fn available(&self) -> Vec<&ModelInfo> {
        let mut all: Vec<_> = self.models.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_recognizes_known_models() {
        let registry = ModelRegistry::builtin();
        assert!(registry.is_valid("gpt-3.5-turbo"));
        assert!(registry.is_valid("gpt-4"));
        assert!(!registry.is_valid("gpt-99"));
        assert_eq!(registry.default_model(), "gpt-3.5-turbo");
    }

    #[test]
    fn tiers_follow_model_family() {
        let registry = ModelRegistry::builtin();
        assert_eq!(registry.tier("gpt-3.5-turbo"), Some(ModelTier::Standard));
        assert_eq!(registry.tier("gpt-4"), Some(ModelTier::Premium));
        assert_eq!(registry.tier("gpt-4-32k"), Some(ModelTier::Premium));
        assert_eq!(registry.tier("unknown"), None);
    }

    #[test]
    fn with_model_extends_the_catalog() {
        let registry = ModelRegistry::builtin().with_model(ModelInfo::new(
            "test-tiny",
            "Test Tiny",
            256,
            1024,
            "Synthetic model for tests",
            ModelTier::Standard,
        ));
        assert!(registry.is_valid("test-tiny"));
        assert_eq!(registry.get("test-tiny").unwrap().max_tokens, 256);
    }
}
