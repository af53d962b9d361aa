//! The memoizing invoker: orchestration between cache and provider.
//!
//! [`MemoInvoker`] is the front door for every AI operation. Per request it
//! validates inputs, derives the cache key, answers from the store on a hit,
//! and otherwise pays for one provider call, writing the result back under a
//! tier-dependent TTL. Concurrent misses for the same key are coalesced onto
//! a single provider call.
//!
//! Cache failures are never the caller's problem: a refused write (store at
//! capacity) is logged and the fresh result returned anyway. Provider
//! failures propagate unchanged and are never cached — on the failure path
//! the cache is invisible.

mod flight;
mod policy;

pub use policy::TtlPolicy;

use crate::cache::{CacheKey, CacheKeyBuilder, CacheReport, CacheStats, StoreConfig, TtlStore};
use crate::models::{ModelRegistry, ModelTier};
use crate::provider::Provider;
use crate::types::{Operation, RequestParams};
use crate::{Error, ErrorContext, Result};
use flight::FlightGroup;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Builder for [`MemoInvoker`].
pub struct MemoInvokerBuilder {
    provider: Option<Arc<dyn Provider>>,
    registry: ModelRegistry,
    store_config: StoreConfig,
    keys: CacheKeyBuilder,
    policy: TtlPolicy,
    sweep_interval: Option<Duration>,
}

impl MemoInvokerBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            registry: ModelRegistry::builtin(),
            store_config: StoreConfig::default(),
            keys: CacheKeyBuilder::new(),
            policy: TtlPolicy::default(),
            sweep_interval: None,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = config;
        self
    }

    pub fn with_key_builder(mut self, keys: CacheKeyBuilder) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Spawn a background sweep reclaiming expired entries at this interval.
    /// Purely advisory — check-on-read already guarantees expired entries are
    /// never returned. Requires a tokio runtime at build time.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    pub fn build(self) -> Result<MemoInvoker> {
        let provider = self.provider.ok_or_else(|| {
            Error::validation_with_context(
                "a provider is required",
                ErrorContext::new()
                    .with_field_path("builder.provider")
                    .with_source("memo_invoker_builder"),
            )
        })?;
        let store = Arc::new(TtlStore::new(self.store_config));
        let sweeper = self.sweep_interval.map(|period| {
            let store = store.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    store.purge_expired();
                }
            })
        });
        Ok(MemoInvoker {
            provider,
            registry: self.registry,
            store,
            keys: self.keys,
            policy: self.policy,
            flights: FlightGroup::new(),
            sweeper,
        })
    }
}

impl Default for MemoInvokerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoizing front door for AI operations.
///
/// Owns the process-wide [`TtlStore`] instance. Construct one at startup and
/// share it (`Arc<MemoInvoker>`) with every component that issues requests;
/// tests build their own with isolated stores.
pub struct MemoInvoker {
    provider: Arc<dyn Provider>,
    registry: ModelRegistry,
    store: Arc<TtlStore>,
    keys: CacheKeyBuilder,
    policy: TtlPolicy,
    flights: FlightGroup,
    sweeper: Option<JoinHandle<()>>,
}

impl MemoInvoker {
    /// Invoker with default registry, store and policy.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        // The builder only fails when no provider is given.
        match MemoInvokerBuilder::new().with_provider(provider).build() {
            Ok(invoker) => invoker,
            Err(_) => unreachable!("builder cannot fail with a provider set"),
        }
    }

    pub fn builder() -> MemoInvokerBuilder {
        MemoInvokerBuilder::new()
    }

    /// Execute one memoized operation.
    ///
    /// `model` defaults to the registry's default model. Returns
    /// [`Error::Validation`] before touching cache or provider when the model
    /// is unknown or the payload/params are out of range; provider failures
    /// propagate as [`Error::Provider`], uncached.
    pub async fn execute(
        &self,
        operation: Operation,
        model: Option<&str>,
        payload: &str,
        params: &RequestParams,
    ) -> Result<String> {
        let model = model.unwrap_or_else(|| self.registry.default_model());
        self.validate(operation, model, payload, params)?;

        let key = self.keys.build(operation, model, payload);
        if let Some(cached) = self.store.get(&key) {
            return Ok(cached);
        }

        info!(%operation, model, "cache miss, invoking provider");
        let tier = self.registry.tier(model).unwrap_or(ModelTier::Standard);
        let ttl = self.policy.ttl_for(operation, tier);

        let provider = self.provider.clone();
        let store = self.store.clone();
        let flight_key = key.clone();
        let model_owned = model.to_string();
        let payload_owned = payload.to_string();
        let params_owned = params.clone();
        self.flights
            .run(key.as_str(), async move {
                let result = provider
                    .invoke(operation, &model_owned, &payload_owned, &params_owned)
                    .await?;
                if !store.set_with_ttl(&flight_key, result.clone(), ttl) {
                    // Non-fatal: the caller still gets the fresh result.
                    warn!(key = %flight_key, "cache write refused, store at capacity");
                }
                Ok(result)
            })
            .await
    }

    /// Memoized chat completion.
    pub async fn chat_completion(
        &self,
        message: &str,
        model: Option<&str>,
        params: &RequestParams,
    ) -> Result<String> {
        self.execute(Operation::Chat, model, message, params).await
    }

    /// Memoized free-form text generation.
    pub async fn generate_text(
        &self,
        prompt: &str,
        model: Option<&str>,
        params: &RequestParams,
    ) -> Result<String> {
        self.execute(Operation::Generate, model, prompt, params)
            .await
    }

    /// Memoized sentiment analysis; result is one of
    /// `positive`/`negative`/`neutral`.
    pub async fn analyze_sentiment(&self, text: &str, model: Option<&str>) -> Result<String> {
        self.execute(Operation::Sentiment, model, text, &RequestParams::new())
            .await
    }

    /// Memoized summarization.
    pub async fn summarize_text(
        &self,
        text: &str,
        model: Option<&str>,
        params: &RequestParams,
    ) -> Result<String> {
        self.execute(Operation::Summarize, model, text, params).await
    }

    fn validate(
        &self,
        operation: Operation,
        model: &str,
        payload: &str,
        params: &RequestParams,
    ) -> Result<()> {
        if !self.registry.is_valid(model) {
            let available: Vec<&str> = self
                .registry
                .available()
                .iter()
                .map(|m| m.id.as_str())
                .collect();
            return Err(Error::validation_with_context(
                format!(
                    "Invalid model: {}. Available models: {}",
                    model,
                    available.join(", ")
                ),
                ErrorContext::new()
                    .with_field_path("request.model")
                    .with_source("request_validator"),
            ));
        }

        if payload.is_empty() {
            return Err(Error::validation_with_context(
                "payload must not be empty",
                ErrorContext::new()
                    .with_field_path("request.payload")
                    .with_source("request_validator"),
            ));
        }
        let len = payload.chars().count();
        let max_len = operation.max_payload_len();
        if len > max_len {
            return Err(Error::validation_with_context(
                format!("payload too long for {operation}: {len} > {max_len} characters"),
                ErrorContext::new()
                    .with_field_path("request.payload")
                    .with_details(format!("max {max_len} characters"))
                    .with_source("request_validator"),
            ));
        }

        if let Some(t) = params.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(Error::validation_with_context(
                    format!("temperature out of range: {t}"),
                    ErrorContext::new()
                        .with_field_path("request.params.temperature")
                        .with_details("accepted range 0.0..=2.0")
                        .with_source("request_validator"),
                ));
            }
        }
        if params.max_tokens == Some(0) {
            return Err(Error::validation_with_context(
                "max_tokens must be at least 1",
                ErrorContext::new()
                    .with_field_path("request.params.max_tokens")
                    .with_source("request_validator"),
            ));
        }
        if let Some(l) = params.max_length {
            if !(50..=1000).contains(&l) {
                return Err(Error::validation_with_context(
                    format!("max_length out of range: {l}"),
                    ErrorContext::new()
                        .with_field_path("request.params.max_length")
                        .with_details("accepted range 50..=1000")
                        .with_source("request_validator"),
                ));
            }
        }
        Ok(())
    }

    /// Build the cache key this invoker would use for a request.
    pub fn cache_key(&self, operation: Operation, model: &str, payload: &str) -> CacheKey {
        self.keys.build(operation, model, payload)
    }

    /// Counter snapshot from the underlying store.
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Administrative report: configuration plus counters. Reachable only by
    /// privileged callers; authorization is the embedding service's concern.
    pub fn report(&self) -> CacheReport {
        let stats = self.store.stats();
        let config = self.store.config();
        CacheReport {
            size: self.store.len(),
            max_size: config.max_keys,
            default_ttl_secs: config.default_ttl.as_secs(),
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            total_keys: stats.total_keys,
            expired_count: stats.expired,
        }
    }

    /// Zero hit/miss/expired counters; store contents are unaffected.
    pub fn reset_stats(&self) {
        self.store.reset_stats();
        info!("cache statistics reset");
    }

    /// Drop every cached entry. Statistics are not reset by this.
    pub fn flush_all(&self) {
        let removed = self.store.len();
        self.store.flush_all();
        info!(removed, "cache flushed");
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Shared handle to the underlying store.
    pub fn store(&self) -> &Arc<TtlStore> {
        &self.store
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

impl Drop for MemoInvoker {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
