//! Tests for error types

use hirelight_loadkit::core::OrchestratorError;

#[test]
fn test_invalid_config_display() {
    let err = OrchestratorError::InvalidConfig("cache invalid: default_ttl_ms".into());
    assert_eq!(
        err.to_string(),
        "invalid configuration: cache invalid: default_ttl_ms"
    );
}

#[test]
fn test_fetch_display_carries_source_message() {
    let err = OrchestratorError::fetch(anyhow::anyhow!("connection refused"));
    assert_eq!(err.to_string(), "fetch failed: connection refused");
}

#[test]
fn test_fetch_clones_share_one_failure() {
    let err = OrchestratorError::fetch(anyhow::anyhow!("backend down"));
    let for_second_waiter = err.clone();
    assert_eq!(err.to_string(), for_second_waiter.to_string());
}
