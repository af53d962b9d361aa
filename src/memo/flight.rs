//! Single-flight coalescing for concurrent cache misses.
//!
//! Two concurrent misses for the same key would otherwise both pay for a
//! provider call. The flight group keeps a map of key → shared future: the
//! first caller (the leader) starts the flight, later callers clone the
//! shared handle and await the same result. This is why [`crate::Error`] is
//! `Clone` — a failed flight hands the identical error to every waiter.
//!
//! A cancelled waiter does not abort the flight for the others; only if every
//! waiter is dropped does the underlying future stop being polled, in which
//! case no cache write happens for that attempt.

use crate::Result;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::Mutex;
use tracing::debug;

type FlightFuture = Shared<BoxFuture<'static, Result<String>>>;

#[derive(Default)]
pub(crate) struct FlightGroup {
    inflight: Mutex<HashMap<String, FlightFuture>>,
}

impl FlightGroup {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run `work` for `key`, coalescing concurrent callers onto one flight.
    pub(crate) async fn run<F>(&self, key: &str, work: F) -> Result<String>
    where
        F: Future<Output = Result<String>> + Send + 'static,
    {
        let flight = {
            let mut inflight = self.inflight.lock().await;
            if let Some(existing) = inflight.get(key) {
                debug!(key, "joining in-flight provider call");
                existing.clone()
            } else {
                let flight = work.boxed().shared();
                inflight.insert(key.to_string(), flight.clone());
                flight
            }
        };

        let result = flight.clone().await;

        // Only the flight we awaited may be retired; a newer flight under the
        // same key must not be knocked out by a slow waiter.
        let mut inflight = self.inflight.lock().await;
        if let Some(current) = inflight.get(key) {
            if current.ptr_eq(&flight) {
                inflight.remove(key);
            }
        }
        result
    }

    #[cfg(test)]
    pub(crate) async fn in_flight(&self) -> usize {
        self.inflight.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_callers_share_one_flight() {
        let group = Arc::new(FlightGroup::new());
        let calls = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let group = group.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                group
                    .run("k", async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Ok("value".to_string())
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "value");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(group.in_flight().await, 0);
    }

    #[tokio::test]
    async fn errors_fan_out_to_every_waiter() {
        let group = Arc::new(FlightGroup::new());
        let mut handles = Vec::new();
        for _ in 0..3 {
            let group = group.clone();
            handles.push(tokio::spawn(async move {
                group
                    .run("k", async {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Err(Error::provider("upstream down"))
                    })
                    .await
            }));
        }
        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert_eq!(err, Error::provider("upstream down"));
        }
    }

    #[tokio::test]
    async fn sequential_flights_do_not_share_results() {
        let group = FlightGroup::new();
        let first = group.run("k", async { Ok("one".to_string()) }).await;
        let second = group.run("k", async { Ok("two".to_string()) }).await;
        assert_eq!(first.unwrap(), "one");
        assert_eq!(second.unwrap(), "two");
    }
}
