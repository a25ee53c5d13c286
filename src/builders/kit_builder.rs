//! Construct validated orchestration primitives from a [`LoadkitConfig`].

use std::time::Duration;

use crate::config::LoadkitConfig;
use crate::core::{
    AsyncLoader, BackoffTimer, DelaySchedule, Loader, LoaderOptions, OrchestratorError,
    RequestCache, Spawn, TimerOptions, TimerTask, ToastQueue,
};

/// Build a request cache with the configured default TTL.
///
/// # Errors
///
/// [`OrchestratorError::InvalidConfig`] when the configuration fails
/// validation.
pub fn build_cache<T>(cfg: &LoadkitConfig) -> Result<RequestCache<T>, OrchestratorError>
where
    T: Clone + Send + Sync + 'static,
{
    cfg.validate().map_err(OrchestratorError::InvalidConfig)?;
    Ok(RequestCache::new(Duration::from_millis(
        cfg.cache.default_ttl_ms,
    )))
}

/// Build a toast queue with the configured default expiry.
///
/// # Errors
///
/// [`OrchestratorError::InvalidConfig`] when the configuration fails
/// validation.
pub fn build_toast_queue<S>(
    cfg: &LoadkitConfig,
    spawner: S,
) -> Result<ToastQueue<S>, OrchestratorError>
where
    S: Spawn,
{
    cfg.validate().map_err(OrchestratorError::InvalidConfig)?;
    Ok(ToastQueue::new(
        Duration::from_millis(cfg.toast.default_duration_ms),
        spawner,
    ))
}

/// Build timer options carrying the configured limits and backoff schedule.
///
/// # Errors
///
/// [`OrchestratorError::InvalidConfig`] when the configuration fails
/// validation.
pub fn build_timer_options(cfg: &LoadkitConfig) -> Result<TimerOptions, OrchestratorError> {
    cfg.validate().map_err(OrchestratorError::InvalidConfig)?;
    let mut options = TimerOptions::new()
        .with_initial_delay(Duration::from_millis(cfg.timer.initial_delay_ms))
        .with_schedule(DelaySchedule::Backoff(cfg.timer.backoff.clone()));
    if let Some(max) = cfg.timer.max_attempts {
        options = options.with_max_attempts(max);
    }
    if let Some(ms) = cfg.timer.max_duration_ms {
        options = options.with_max_duration(Duration::from_millis(ms));
    }
    Ok(options)
}

/// Build a backoff timer around `task` with the configured options.
///
/// # Errors
///
/// [`OrchestratorError::InvalidConfig`] when the configuration fails
/// validation.
pub fn build_timer<C, S>(
    cfg: &LoadkitConfig,
    task: impl TimerTask<C>,
    spawner: S,
) -> Result<BackoffTimer<C, S>, OrchestratorError>
where
    C: Clone + Send + 'static,
    S: Spawn,
{
    let options = build_timer_options(cfg)?;
    Ok(BackoffTimer::new(task, options, spawner))
}

/// Build an async loader around `loader` with the configured defaults.
///
/// # Errors
///
/// [`OrchestratorError::InvalidConfig`] when the configuration fails
/// validation.
pub fn build_loader<T, S>(
    cfg: &LoadkitConfig,
    loader: impl Loader<T>,
    spawner: S,
) -> Result<AsyncLoader<T, S>, OrchestratorError>
where
    T: Clone + Send + Sync + 'static,
    S: Spawn + Clone + Send + 'static,
{
    cfg.validate().map_err(OrchestratorError::InvalidConfig)?;
    let options = LoaderOptions::new()
        .with_immediate(cfg.loader.immediate)
        .with_fallback_message(cfg.loader.fallback_message.clone());
    Ok(AsyncLoader::new(loader, options, spawner))
}
