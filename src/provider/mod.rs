//! Provider seam: the one external call the memoization layer pays for.
//!
//! Everything upstream of the cache is reached through the [`Provider`]
//! trait. The trait is object-safe so the invoker can hold any backend as
//! `Arc<dyn Provider>`: the real HTTP client ([`OpenAiProvider`]), the
//! deterministic [`MockProvider`] used in tests and offline development, or
//! a caller-supplied implementation.

mod mock;
mod openai;

pub use mock::MockProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};

use crate::types::{Operation, RequestParams};
use crate::Result;
use async_trait::async_trait;

/// A text-generation backend.
///
/// `invoke` is the only suspension point on the request path; failures
/// surface as [`crate::Error::Provider`] and are never cached.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn invoke(
        &self,
        operation: Operation,
        model: &str,
        payload: &str,
        params: &RequestParams,
    ) -> Result<String>;

    fn name(&self) -> &'static str;
}
