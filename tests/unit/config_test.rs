//! Tests for configuration validation

use hirelight_loadkit::config::{
    BackoffPolicy, CacheSettings, LoadkitConfig, TimerSettings, ToastSettings,
};

#[test]
fn test_default_config_is_valid() {
    let cfg = LoadkitConfig::default();
    assert!(cfg.validate().is_ok());
    assert!(cfg.loader.immediate);
    assert_eq!(cfg.loader.fallback_message, "Request failed");
    assert_eq!(cfg.timer.backoff.base_ms, 1500);
    assert_eq!(cfg.timer.backoff.cap_ms, 5000);
}

#[test]
fn test_backoff_rejects_zero_base() {
    let policy = BackoffPolicy {
        base_ms: 0,
        cap_ms: 5000,
        factor: 1.4,
    };
    assert!(policy.validate().is_err());
}

#[test]
fn test_backoff_rejects_cap_below_base() {
    let policy = BackoffPolicy {
        base_ms: 1500,
        cap_ms: 1000,
        factor: 1.4,
    };
    assert!(policy.validate().is_err());
}

#[test]
fn test_backoff_rejects_shrinking_factor() {
    let policy = BackoffPolicy {
        base_ms: 1500,
        cap_ms: 5000,
        factor: 0.5,
    };
    assert!(policy.validate().is_err());
}

#[test]
fn test_cache_rejects_zero_ttl() {
    let settings = CacheSettings { default_ttl_ms: 0 };
    assert!(settings.validate().is_err());
}

#[test]
fn test_toast_rejects_zero_duration() {
    let settings = ToastSettings {
        default_duration_ms: 0,
    };
    assert!(settings.validate().is_err());
}

#[test]
fn test_timer_rejects_zero_limits() {
    let settings = TimerSettings {
        max_attempts: Some(0),
        ..TimerSettings::default()
    };
    assert!(settings.validate().is_err());

    let settings = TimerSettings {
        max_duration_ms: Some(0),
        ..TimerSettings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn test_root_validate_names_the_section() {
    let mut cfg = LoadkitConfig::default();
    cfg.cache.default_ttl_ms = 0;
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("cache invalid"), "got: {err}");
}

#[test]
fn test_from_json_str_applies_defaults() {
    let cfg = LoadkitConfig::from_json_str(r#"{"cache": {"default_ttl_ms": 250}}"#).unwrap();
    assert_eq!(cfg.cache.default_ttl_ms, 250);
    assert_eq!(cfg.toast.default_duration_ms, 5000);
    assert!((cfg.timer.backoff.factor - 1.4).abs() < f64::EPSILON);
}

#[test]
fn test_from_json_str_rejects_invalid_values() {
    let err = LoadkitConfig::from_json_str(r#"{"timer": {"backoff": {"base_ms": 0, "cap_ms": 10}}}"#)
        .unwrap_err();
    assert!(err.contains("base_ms"), "got: {err}");
}

#[test]
fn test_from_json_str_rejects_malformed_input() {
    let err = LoadkitConfig::from_json_str("not json").unwrap_err();
    assert!(err.contains("parse error"), "got: {err}");
}
