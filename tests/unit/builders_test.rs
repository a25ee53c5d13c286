//! Tests for configuration-driven builders

use std::time::Duration;

use hirelight_loadkit::builders::{
    build_cache, build_loader, build_timer, build_timer_options, build_toast_queue,
};
use hirelight_loadkit::config::LoadkitConfig;
use hirelight_loadkit::core::{loader_fn, tick_fn, LoadOutcome, OrchestratorError};
use hirelight_loadkit::runtime::TokioSpawner;
use tokio::time::Instant;

fn invalid_config() -> LoadkitConfig {
    let mut cfg = LoadkitConfig::default();
    cfg.cache.default_ttl_ms = 0;
    cfg
}

#[test]
fn test_build_cache_from_valid_config() {
    let cfg = LoadkitConfig::default();
    let cache = build_cache::<String>(&cfg).unwrap();
    assert!(cache.is_empty());
}

#[test]
fn test_builders_reject_invalid_config() {
    let cfg = invalid_config();
    assert!(matches!(
        build_cache::<String>(&cfg),
        Err(OrchestratorError::InvalidConfig(_))
    ));
    assert!(matches!(
        build_timer_options(&cfg),
        Err(OrchestratorError::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn test_build_toast_queue_uses_configured_default() {
    let cfg = LoadkitConfig::default();
    let queue = build_toast_queue(&cfg, TokioSpawner::current()).unwrap();
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_build_timer_carries_limits() {
    let mut cfg = LoadkitConfig::default();
    cfg.timer.max_attempts = Some(2);
    cfg.timer.backoff.base_ms = 10;
    cfg.timer.backoff.cap_ms = 10;

    let ticks = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
    let ticks_in_task = std::sync::Arc::clone(&ticks);
    let timer = build_timer(
        &cfg,
        tick_fn(move |(), _attempt: u32, _started_at: Instant| {
            ticks_in_task.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async move { Ok::<_, anyhow::Error>(true) }
        }),
        TokioSpawner::current(),
    )
    .unwrap();

    timer.start(());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ticks.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert!(!timer.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_build_loader_honors_immediate_flag() {
    let mut cfg = LoadkitConfig::default();
    cfg.loader.immediate = false;
    cfg.loader.fallback_message = "Could not reach Hirelight".to_string();

    let loader = build_loader(
        &cfg,
        loader_fn(|_cancel| async move { Err::<u32, _>(anyhow::anyhow!("")) }),
        TokioSpawner::current(),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(loader.data().is_none(), "immediate=false must not dispatch");

    // Empty failure message falls back to the configured one.
    let outcome = loader.load(true).await;
    assert_eq!(
        outcome,
        LoadOutcome::Failed("Could not reach Hirelight".to_string())
    );
}
