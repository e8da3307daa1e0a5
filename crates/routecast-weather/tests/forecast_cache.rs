//! Fetcher and cache interplay: idempotence, expiry, single flight, cancellation.
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{mild_days, FakeGeocoder, FakeProvider, Harness};
use routecast_weather::{CacheKey, Clock, ForecastCache};

#[tokio::test]
async fn test_second_fetch_within_ttl_hits_cache() {
    let harness = Harness::new(FakeGeocoder::new(), FakeProvider::new().with_days("1", mild_days(5)));

    let first = harness.fetcher.fetch("1", 3).await.unwrap();
    harness.clock.advance(Duration::from_secs(3599));
    let second = harness.fetcher.fetch("1", 3).await.unwrap();

    assert_eq!(harness.provider.calls_for("1"), 1);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[tokio::test]
async fn test_fetch_after_ttl_goes_upstream_again() {
    let harness = Harness::new(FakeGeocoder::new(), FakeProvider::new().with_days("1", mild_days(5)));

    harness.fetcher.fetch("1", 3).await.unwrap();
    harness.clock.advance(Duration::from_secs(3600));
    harness.fetcher.fetch("1", 3).await.unwrap();

    assert_eq!(harness.provider.calls_for("1"), 2);
}

#[tokio::test]
async fn test_different_horizons_are_separate_entries() {
    let harness = Harness::new(FakeGeocoder::new(), FakeProvider::new().with_days("1", mild_days(5)));

    let short = harness.fetcher.fetch("1", 1).await.unwrap();
    let long = harness.fetcher.fetch("1", 5).await.unwrap();

    assert_eq!(short.len(), 1);
    assert_eq!(long.len(), 5);
    assert_eq!(harness.provider.calls_for("1"), 2);
    assert_eq!(harness.cache.len(), 2);
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let harness = Harness::new(FakeGeocoder::new(), FakeProvider::new().with_days("1", mild_days(1)));

    // Asking for more days than upstream has is an error, and must not poison the key.
    assert!(harness.fetcher.fetch("1", 2).await.is_err());
    assert!(harness
        .cache
        .get(&CacheKey::new("1", 2), harness.clock.now())
        .is_none());
    assert!(harness.fetcher.fetch("1", 2).await.is_err());
    assert_eq!(harness.provider.calls_for("1"), 2);
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_upstream_call() {
    let harness = Harness::new(
        FakeGeocoder::new(),
        FakeProvider::new()
            .with_days("1", mild_days(3))
            .with_delay(Duration::from_millis(30)),
    );

    let fetches = (0..8).map(|_| {
        let fetcher = Arc::clone(&harness.fetcher);
        tokio::spawn(async move { fetcher.fetch("1", 3).await })
    });
    let results = futures::future::join_all(fetches).await;

    let series: Vec<_> = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();
    assert!(series.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(harness.provider.calls_for("1"), 1);
}

#[tokio::test]
async fn test_different_keys_do_not_wait_on_each_other() {
    let harness = Harness::new(
        FakeGeocoder::new(),
        FakeProvider::new()
            .with_days("1", mild_days(1))
            .with_days("2", mild_days(1))
            .with_delay(Duration::from_millis(20)),
    );

    let (a, b) = tokio::join!(harness.fetcher.fetch("1", 1), harness.fetcher.fetch("2", 1));

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(harness.provider.total_calls(), 2);
}

#[tokio::test]
async fn test_cancelled_fetch_leaves_cache_consistent() {
    let harness = Harness::new(
        FakeGeocoder::new(),
        FakeProvider::new()
            .with_days("1", mild_days(1))
            .with_delay(Duration::from_millis(200)),
    );

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), harness.fetcher.fetch("1", 1)).await;
    assert!(abandoned.is_err());
    assert!(harness.cache.is_empty());

    // The next caller is not blocked by the abandoned one and fills the cache.
    let series = harness.fetcher.fetch("1", 1).await.unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(harness.provider.calls_for("1"), 2);
    assert_eq!(harness.cache.len(), 1);
}
