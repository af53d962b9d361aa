//! # ai-memo-cache
//!
//! Memoization layer for expensive text-generation providers. Given a logical
//! operation (chat, generate, sentiment, summarize), a model id and an input
//! payload, the crate decides whether a previously computed result can be
//! reused; if not it invokes the provider once and stores the result under a
//! time-bounded key.
//!
//! ## Core Philosophy
//!
//! - **Cache is invisible on failure**: a refused cache write never fails the
//!   request, and a provider error looks exactly as it would with no cache.
//! - **Never stale**: expiry is enforced on every read; a logically expired
//!   entry is never returned, sweep or no sweep.
//! - **Bounded**: capacity is a hard ceiling, not an eviction policy.
//! - **Pay once**: concurrent identical misses are coalesced onto a single
//!   provider call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_memo_cache::{MemoInvoker, MockProvider, RequestParams};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> ai_memo_cache::Result<()> {
//!     let invoker = MemoInvoker::new(Arc::new(MockProvider::new()));
//!
//!     // First call pays for the provider; the second is a cache hit.
//!     let params = RequestParams::new().with_temperature(0.7);
//!     let a = invoker.chat_completion("Hello!", None, &params).await?;
//!     let b = invoker.chat_completion("Hello!", None, &params).await?;
//!     assert_eq!(a, b);
//!
//!     println!("{:?}", invoker.report());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | TTL store, key derivation, statistics |
//! | [`memo`] | Memoizing invoker, TTL policy, single-flight |
//! | [`provider`] | Provider trait plus OpenAI and mock backends |
//! | [`models`] | Model catalog and tier registry |
//! | [`types`] | Operations and request parameters |

pub mod cache;
pub mod memo;
pub mod models;
pub mod provider;
pub mod types;

pub mod error;
pub use error::{Error, ErrorContext};

// Re-export main types for convenience
pub use cache::{CacheKey, CacheKeyBuilder, CacheReport, CacheStats, StoreConfig, TtlStore};
pub use memo::{MemoInvoker, MemoInvokerBuilder, TtlPolicy};
pub use models::{ModelInfo, ModelRegistry, ModelTier};
pub use provider::{MockProvider, OpenAiConfig, OpenAiProvider, Provider};
pub use types::{Operation, RequestParams};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
