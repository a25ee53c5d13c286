//! Tests for utility functions

use hirelight_loadkit::util::{init_tracing, now_ms};

#[test]
fn test_now_ms_is_recent() {
    // 2024-01-01T00:00:00Z in milliseconds.
    assert!(now_ms() > 1_704_067_200_000);
}

#[test]
fn test_now_ms_is_monotonic_enough() {
    let first = now_ms();
    let second = now_ms();
    assert!(second >= first);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
