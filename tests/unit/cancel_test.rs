//! Tests for the cooperative cancellation token

use hirelight_loadkit::core::CancelToken;

#[test]
fn test_fresh_token_is_not_cancelled() {
    let token = CancelToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn test_cancel_is_idempotent() {
    let token = CancelToken::new();
    token.cancel();
    token.cancel();
    assert!(token.is_cancelled());
}

#[test]
fn test_clones_observe_the_same_flag() {
    let token = CancelToken::new();
    let handed_to_loader = token.clone();
    token.cancel();
    assert!(handed_to_loader.is_cancelled());
}
