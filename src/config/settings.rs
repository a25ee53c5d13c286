//! Orchestration configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Capped exponential backoff: `min(round(base × factor^attempt), cap)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// First delay in milliseconds. Must be at least 1.
    pub base_ms: u64,
    /// Upper bound on any delay in milliseconds. Must be at least `base_ms`.
    pub cap_ms: u64,
    /// Multiplicative growth per attempt. Must be at least 1.0.
    #[serde(default = "default_factor")]
    pub factor: f64,
}

fn default_factor() -> f64 {
    1.4
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_ms: 1500,
            cap_ms: 5000,
            factor: default_factor(),
        }
    }
}

impl BackoffPolicy {
    /// Validate policy values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_ms == 0 {
            return Err("base_ms must be at least 1".into());
        }
        if self.cap_ms < self.base_ms {
            return Err("cap_ms must be at least base_ms".into());
        }
        if self.factor < 1.0 {
            return Err("factor must be at least 1.0".into());
        }
        Ok(())
    }

    /// Delay in milliseconds after `attempt` completed. Non-decreasing in
    /// `attempt` and never above `cap_ms`.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let raw = (self.base_ms as f64) * self.factor.powi(exponent);
        if raw.is_finite() {
            // float-to-int casts saturate, so an overflowing round still caps
            (raw.round() as u64).min(self.cap_ms)
        } else {
            self.cap_ms
        }
    }

    /// Delay as a [`Duration`].
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.delay_ms(attempt))
    }
}

/// Defaults for async loaders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// Whether loaders self-invoke once on creation.
    #[serde(default = "default_true")]
    pub immediate: bool,
    /// Message used when a failure carries no usable message of its own.
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

fn default_true() -> bool {
    true
}

fn default_fallback_message() -> String {
    "Request failed".to_string()
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            immediate: true,
            fallback_message: default_fallback_message(),
        }
    }
}

impl LoaderSettings {
    /// Validate loader settings.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.fallback_message.is_empty() {
            return Err("fallback_message must not be empty".into());
        }
        Ok(())
    }
}

/// Defaults for request caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// TTL in milliseconds applied when a call does not override it.
    #[serde(default = "default_ttl_ms")]
    pub default_ttl_ms: u64,
}

fn default_ttl_ms() -> u64 {
    30_000
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl_ms: default_ttl_ms(),
        }
    }
}

impl CacheSettings {
    /// Validate cache settings.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_ttl_ms == 0 {
            return Err("default_ttl_ms must be greater than 0".into());
        }
        Ok(())
    }
}

/// Defaults for toast queues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastSettings {
    /// Expiry delay in milliseconds for non-sticky items without their own.
    #[serde(default = "default_duration_ms")]
    pub default_duration_ms: u64,
}

fn default_duration_ms() -> u64 {
    5_000
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            default_duration_ms: default_duration_ms(),
        }
    }
}

impl ToastSettings {
    /// Validate toast settings.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_duration_ms == 0 {
            return Err("default_duration_ms must be greater than 0".into());
        }
        Ok(())
    }
}

/// Defaults for backoff timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimerSettings {
    /// Delay in milliseconds before the first attempt.
    #[serde(default)]
    pub initial_delay_ms: u64,
    /// Stop after this many attempts, if set.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Stop once a session has run this long, if set.
    #[serde(default)]
    pub max_duration_ms: Option<u64>,
    /// Delay growth between attempts.
    #[serde(default)]
    pub backoff: BackoffPolicy,
}

impl TimerSettings {
    /// Validate timer settings.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == Some(0) {
            return Err("max_attempts must be greater than 0 when set".into());
        }
        if self.max_duration_ms == Some(0) {
            return Err("max_duration_ms must be greater than 0 when set".into());
        }
        self.backoff.validate()
    }
}

/// Root orchestration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoadkitConfig {
    /// Loader defaults.
    #[serde(default)]
    pub loader: LoaderSettings,
    /// Cache defaults.
    #[serde(default)]
    pub cache: CacheSettings,
    /// Toast defaults.
    #[serde(default)]
    pub toast: ToastSettings,
    /// Timer defaults.
    #[serde(default)]
    pub timer: TimerSettings,
}

impl LoadkitConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns a message naming the section and the violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        self.loader
            .validate()
            .map_err(|e| format!("loader invalid: {e}"))?;
        self.cache
            .validate()
            .map_err(|e| format!("cache invalid: {e}"))?;
        self.toast
            .validate()
            .map_err(|e| format!("toast invalid: {e}"))?;
        self.timer
            .validate()
            .map_err(|e| format!("timer invalid: {e}"))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message for parse failures and validation failures alike.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the environment, starting from defaults.
    /// Reads a `.env` file when present. Recognized variables:
    /// `LOADKIT_LOADER_IMMEDIATE`, `LOADKIT_CACHE_TTL_MS`,
    /// `LOADKIT_TOAST_DURATION_MS`, `LOADKIT_BACKOFF_BASE_MS`,
    /// `LOADKIT_BACKOFF_CAP_MS`, `LOADKIT_BACKOFF_FACTOR`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that failed to parse, or the
    /// validation failure.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        let mut cfg = Self::default();
        if let Ok(value) = std::env::var("LOADKIT_LOADER_IMMEDIATE") {
            cfg.loader.immediate = parse_var(&value, "LOADKIT_LOADER_IMMEDIATE")?;
        }
        if let Ok(value) = std::env::var("LOADKIT_CACHE_TTL_MS") {
            cfg.cache.default_ttl_ms = parse_var(&value, "LOADKIT_CACHE_TTL_MS")?;
        }
        if let Ok(value) = std::env::var("LOADKIT_TOAST_DURATION_MS") {
            cfg.toast.default_duration_ms = parse_var(&value, "LOADKIT_TOAST_DURATION_MS")?;
        }
        if let Ok(value) = std::env::var("LOADKIT_BACKOFF_BASE_MS") {
            cfg.timer.backoff.base_ms = parse_var(&value, "LOADKIT_BACKOFF_BASE_MS")?;
        }
        if let Ok(value) = std::env::var("LOADKIT_BACKOFF_CAP_MS") {
            cfg.timer.backoff.cap_ms = parse_var(&value, "LOADKIT_BACKOFF_CAP_MS")?;
        }
        if let Ok(value) = std::env::var("LOADKIT_BACKOFF_FACTOR") {
            cfg.timer.backoff.factor = parse_var(&value, "LOADKIT_BACKOFF_FACTOR")?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T>(value: &str, name: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| format!("{name} invalid: {e}"))
}
