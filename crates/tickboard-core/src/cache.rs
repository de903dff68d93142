//! Single-flight TTL cache for serialized responses.
//!
//! Process-wide shared state, created once at startup and handed to every
//! request handler. Values are stored as serialized JSON bodies; expiry is
//! checked lazily on read, so unread stale entries carry no cost and no
//! background sweep runs.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug)]
struct Slot {
    body: Option<String>,
    expires_at: Instant,
}

impl Slot {
    fn empty() -> Self {
        Self {
            body: None,
            expires_at: Instant::now(),
        }
    }

    fn live_body(&self) -> Option<&str> {
        match &self.body {
            Some(body) if Instant::now() <= self.expires_at => Some(body),
            _ => None,
        }
    }
}

/// Time-bounded key→value store with a per-key single-flight guarantee.
///
/// Concurrent callers for the same key serialize on that key's slot: one
/// becomes the computing party, the rest observe its stored value. Distinct
/// keys only share a momentary map lock, never each other's compute.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    slots: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<Slot>>>>>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            default_ttl,
        }
    }

    /// Serve `key` from a live entry, or run `compute` exactly once and
    /// store its result for `ttl` (the default TTL when `None`).
    ///
    /// A failed `compute` is propagated unchanged and never stored; the
    /// next caller gets a fresh attempt. An entry that no longer decodes
    /// as `T` is discarded and treated as a miss.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let slot = self.slot(key);
        // Holding the slot lock across the compute is the single-flight
        // mechanism: waiters on the same key block here, then observe the
        // freshly stored body.
        let mut slot = slot.lock().await;

        if let Some(body) = slot.live_body() {
            match serde_json::from_str(body) {
                Ok(value) => {
                    tracing::debug!(key, "cache hit");
                    return Ok(value);
                }
                Err(error) => {
                    tracing::warn!(key, %error, "discarding undecodable cache entry");
                }
            }
        }

        tracing::debug!(key, "cache miss");
        let value = compute().await?;
        match serde_json::to_string(&value) {
            Ok(body) => {
                slot.body = Some(body);
                slot.expires_at = Instant::now() + ttl;
            }
            Err(error) => {
                tracing::warn!(key, %error, "response not cacheable, serving uncached");
            }
        }
        Ok(value)
    }

    /// Drop entries whose TTL has elapsed. Slots currently computing are
    /// left alone.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|_, slot| match slot.try_lock() {
            Ok(guard) => guard.body.is_some() && guard.expires_at > now,
            Err(_) => true,
        });
    }

    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of known keys, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &str) -> Arc<tokio::sync::Mutex<Slot>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(Slot::empty())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn second_call_within_ttl_serves_cached_value() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<u32, String> = cache
                .get_or_compute("quote:PETR4.SA", None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(value.expect("must compute"), 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recomputes_after_ttl_elapses() {
        let cache = ResponseCache::new(Duration::from_millis(40));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: Result<u32, String> = cache
                .get_or_compute("k", None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await;
            tokio::time::sleep(Duration::from_millis(60)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_compute_is_not_cached() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let first: Result<u32, String> = cache
            .get_or_compute("k", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(String::from("upstream down"))
            })
            .await;
        assert_eq!(first.expect_err("must fail"), "upstream down");

        let second: Result<u32, String> = cache
            .get_or_compute("k", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await;
        assert_eq!(second.expect("must recover"), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn ttl_override_beats_default() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: Result<u32, String> = cache
                .get_or_compute("k", Some(Duration::from_millis(20)), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await;
            tokio::time::sleep(Duration::from_millis(40)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn poisoned_map_lock_does_not_panic_later_callers() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let _: Result<u32, String> = cache.get_or_compute("k", None, || async { Ok(1) }).await;

        let slots = Arc::clone(&cache.slots);
        let _ = std::thread::spawn(move || {
            let _guard = slots.lock().unwrap();
            panic!("poison the map lock");
        })
        .join();

        assert_eq!(cache.len(), 1);
        cache.purge_expired();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn purge_drops_expired_entries_only() {
        let cache = ResponseCache::new(Duration::from_millis(30));
        let _: Result<u32, String> = cache
            .get_or_compute("stale", None, || async { Ok(1) })
            .await;
        let _: Result<u32, String> = cache
            .get_or_compute("fresh", Some(Duration::from_secs(60)), || async { Ok(2) })
            .await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.purge_expired();

        assert_eq!(cache.len(), 1);
    }
}
