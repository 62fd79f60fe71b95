//! Expiry window tests for the session store.
//!
//! These run on Tokio's paused clock, so "seconds" below are simulated and
//! the tests finish instantly.

use std::time::Duration;

use lapse_session::{Error, ExpiryPolicy, SessionData, SessionStore, StoreConfig};
use serde_json::json;
use tokio::time::{Instant, sleep_until};

fn at(start: Instant, secs: f64) -> Instant {
    start + Duration::from_secs_f64(secs)
}

fn is_not_found<T: std::fmt::Debug>(result: lapse_session::Result<T>) -> bool {
    matches!(result, Err(Error::NotFound(_)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Physical expiry (default)
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_session_lives_at_least_ttl() {
    let start = Instant::now();
    let store = SessionStore::new(StoreConfig::default()).unwrap();
    let id = store.create().unwrap();

    sleep_until(at(start, 4.0)).await;
    assert!(store.get(&id).is_ok());

    sleep_until(at(start, 4.9)).await;
    assert!(store.get(&id).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_session_gone_within_ttl_plus_interval() {
    let start = Instant::now();
    let store = SessionStore::new(StoreConfig::default()).unwrap();
    let id = store.create().unwrap();

    sleep_until(at(start, 4.0)).await;
    assert!(store.get(&id).is_ok());

    sleep_until(at(start, 7.5)).await;
    assert!(is_not_found(store.get(&id)));
    assert!(is_not_found(store.update(&id, SessionData::new())));
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_removal_falls_inside_window() {
    let start = Instant::now();
    let store = SessionStore::new(StoreConfig::default()).unwrap();
    let id = store.create().unwrap();

    // Poll every 100ms and record when the session disappears
    let mut elapsed = None;
    for step in 1..=80 {
        sleep_until(at(start, step as f64 * 0.1)).await;
        if !store.contains(&id) {
            elapsed = Some(step as f64 * 0.1);
            break;
        }
    }

    let elapsed = elapsed.expect("session was never evicted");
    assert!(elapsed >= 5.0, "evicted too early: {elapsed}s");
    assert!(elapsed <= 6.05, "evicted too late: {elapsed}s");
}

#[tokio::test(start_paused = true)]
async fn test_update_resets_ttl() {
    let start = Instant::now();
    let store = SessionStore::new(StoreConfig::default()).unwrap();
    let id = store.create().unwrap();

    sleep_until(at(start, 4.0)).await;
    let mut data = SessionData::new();
    data.insert("website".to_string(), json!("example.org"));
    store.update(&id, data.clone()).unwrap();

    sleep_until(at(start, 8.5)).await;
    assert_eq!(store.get(&id).unwrap(), data);

    sleep_until(at(start, 11.0)).await;
    assert!(is_not_found(store.get(&id)));
}

#[tokio::test(start_paused = true)]
async fn test_only_untouched_sessions_expire() {
    let start = Instant::now();
    let store = SessionStore::new(StoreConfig::default()).unwrap();
    let idle = store.create().unwrap();
    let busy = store.create().unwrap();

    for secs in [2.0, 4.0, 6.0, 8.0] {
        sleep_until(at(start, secs)).await;
        store.update(&busy, SessionData::new()).unwrap();
    }

    assert!(is_not_found(store.get(&idle)));
    assert!(store.get(&busy).is_ok());
    assert_eq!(store.len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Logical expiry
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_logical_expiry_is_exact() {
    let start = Instant::now();
    // Sweeper effectively never runs; lookups alone enforce the TTL
    let config = StoreConfig::new()
        .with_sweep_interval(Duration::from_secs(3600))
        .with_expiry(ExpiryPolicy::Logical);
    let store = SessionStore::new(config).unwrap();
    let id = store.create().unwrap();

    sleep_until(at(start, 4.9)).await;
    assert!(store.get(&id).is_ok());

    sleep_until(at(start, 5.0)).await;
    assert!(is_not_found(store.get(&id)));
}

#[tokio::test(start_paused = true)]
async fn test_physical_expiry_tolerates_lag() {
    let start = Instant::now();
    let config = StoreConfig::new().with_sweep_interval(Duration::from_secs(3600));
    let store = SessionStore::new(config).unwrap();
    let id = store.create().unwrap();

    // Past the TTL but not yet swept: still reachable
    sleep_until(at(start, 10.0)).await;
    assert!(store.get(&id).is_ok());

    assert_eq!(store.sweep(), 1);
    assert!(is_not_found(store.get(&id)));
}
