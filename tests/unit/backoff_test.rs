//! Tests for the backoff delay formula

use std::sync::Arc;
use std::time::Duration;

use hirelight_loadkit::config::BackoffPolicy;
use hirelight_loadkit::core::DelaySchedule;

#[test]
fn test_default_policy_first_delays() {
    let policy = BackoffPolicy::default();
    // round(1500 * 1.4^n) capped at 5000
    assert_eq!(policy.delay_ms(0), 1500);
    assert_eq!(policy.delay_ms(1), 2100);
    assert_eq!(policy.delay_ms(2), 2940);
    assert_eq!(policy.delay_ms(3), 4116);
    assert_eq!(policy.delay_ms(4), 5000);
}

#[test]
fn test_delays_are_non_decreasing_and_capped() {
    let policy = BackoffPolicy::default();
    let mut previous = 0;
    for attempt in 0..64 {
        let delay = policy.delay_ms(attempt);
        assert!(delay >= previous, "delay shrank at attempt {attempt}");
        assert!(delay <= policy.cap_ms, "delay exceeded cap at {attempt}");
        previous = delay;
    }
    assert_eq!(policy.delay_ms(u32::MAX), policy.cap_ms);
}

#[test]
fn test_factor_one_is_a_fixed_interval() {
    let policy = BackoffPolicy {
        base_ms: 800,
        cap_ms: 5000,
        factor: 1.0,
    };
    for attempt in 0..16 {
        assert_eq!(policy.delay_ms(attempt), 800);
    }
}

#[test]
fn test_schedule_variants() {
    let fixed = DelaySchedule::Fixed(Duration::from_millis(250));
    assert_eq!(fixed.delay_for(9), Duration::from_millis(250));

    let backoff = DelaySchedule::Backoff(BackoffPolicy::default());
    assert_eq!(backoff.delay_for(0), Duration::from_millis(1500));

    let custom = DelaySchedule::Custom(Arc::new(|attempt| {
        Duration::from_millis(u64::from(attempt) * 100)
    }));
    assert_eq!(custom.delay_for(3), Duration::from_millis(300));

    assert_eq!(
        DelaySchedule::default().delay_for(0),
        Duration::from_millis(1500)
    );
}
