//! Demo binary: exercises the memoization layer against the mock provider
//! and prints the resulting cache report. Run with RUST_LOG=debug to watch
//! hit/miss accounting.

use ai_memo_cache::{MemoInvoker, MockProvider, RequestParams, StoreConfig};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let provider = Arc::new(MockProvider::new());
    let invoker = MemoInvoker::builder()
        .with_provider(provider.clone())
        .with_store_config(StoreConfig::new().with_max_keys(100))
        .with_sweep_interval(Duration::from_secs(600))
        .build()?;

    let params = RequestParams::new().with_temperature(0.7).with_max_tokens(500);

    println!("first call (miss):");
    let first = invoker
        .chat_completion("What is memoization?", None, &params)
        .await?;
    println!("  {first}");

    println!("second call (hit, no provider invocation):");
    let second = invoker
        .chat_completion("What is memoization?", None, &params)
        .await?;
    println!("  {second}");

    let sentiment = invoker
        .analyze_sentiment("I love this product", Some("gpt-3.5-turbo"))
        .await?;
    println!("sentiment: {sentiment}");

    println!("provider invocations: {}", provider.invocations());
    println!("report: {}", serde_json::to_string_pretty(&invoker.report())?);
    Ok(())
}
