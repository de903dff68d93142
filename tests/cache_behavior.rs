//! Behavior tests for the single-flight TTL cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tickboard_core::ResponseCache;

#[tokio::test]
async fn repeated_lookups_within_ttl_compute_once() {
    let cache = ResponseCache::new(Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..5 {
        let calls = Arc::clone(&calls);
        let value: Result<String, String> = cache
            .get_or_compute("summary:PETR4.SA", None, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(String::from("cached body"))
            })
            .await;
        assert_eq!(value.expect("must compute"), "cached body");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn lookup_after_ttl_recomputes() {
    let cache = ResponseCache::new(Duration::from_millis(50));
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let calls = Arc::clone(&calls);
        let _: Result<u32, String> = cache
            .get_or_compute("summary:VALE3.SA", None, move || async move {
                Ok(calls.fetch_add(1, Ordering::SeqCst) as u32)
            })
            .await;
        tokio::time::sleep(Duration::from_millis(80)).await;
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_lookups_on_one_key_are_single_flight() {
    let cache = ResponseCache::new(Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        let calls = Arc::clone(&calls);
        handles.push(tokio::spawn(async move {
            let value: Result<u32, String> = cache
                .get_or_compute("summary:ITUB4.SA", None, move || async move {
                    // Slow compute: every concurrent caller arrives while
                    // the first one is still in flight.
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            value.expect("must compute")
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.expect("task must finish"), 7);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_compute_is_retried_by_the_next_caller() {
    let cache = ResponseCache::new(Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));

    let first_calls = Arc::clone(&calls);
    let first: Result<u32, String> = cache
        .get_or_compute("summary:BBAS3.SA", None, move || async move {
            first_calls.fetch_add(1, Ordering::SeqCst);
            Err(String::from("upstream unavailable"))
        })
        .await;
    assert!(first.is_err());

    let second_calls = Arc::clone(&calls);
    let second: Result<u32, String> = cache
        .get_or_compute("summary:BBAS3.SA", None, move || async move {
            second_calls.fetch_add(1, Ordering::SeqCst);
            Ok(99)
        })
        .await;
    assert_eq!(second.expect("must recover"), 99);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn distinct_keys_compute_independently() {
    let cache = ResponseCache::new(Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));

    for key in ["summary:PETR4.SA", "summary:VALE3.SA", "basket:dashboard"] {
        let calls = Arc::clone(&calls);
        let _: Result<u32, String> = cache
            .get_or_compute(key, None, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            })
            .await;
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.len(), 3);
}
