//! Integration tests for quota configuration.

use quotagate::Quota;
use std::time::Duration;

#[test]
fn test_quota_per_second() {
    let quota = Quota::per_second(10);
    assert_eq!(quota.max_rate(), 10);
    assert_eq!(quota.window(), Duration::from_secs(1));
}

#[test]
fn test_quota_per_minute() {
    let quota = Quota::per_minute(60);
    assert_eq!(quota.max_rate(), 60);
    assert_eq!(quota.window(), Duration::from_secs(60));
}

#[test]
fn test_quota_custom_window() {
    let quota = Quota::new(100, Duration::from_secs(300)); // 100 per 5 minutes
    assert_eq!(quota.max_rate(), 100);
    assert_eq!(quota.window_secs(), 300);
}

#[test]
fn test_quota_validation() {
    assert!(Quota::try_new(0, Duration::from_secs(60)).is_err());
    assert!(Quota::try_new(10, Duration::ZERO).is_err());
    assert!(Quota::try_new(10, Duration::from_millis(500)).is_err());
    assert!(Quota::try_new(10, Duration::from_secs(3)).is_ok());
}

#[test]
fn test_quota_serde_round_trip() {
    let quota = Quota::new(100, Duration::from_secs(300));

    let json = serde_json::to_string(&quota).unwrap();
    let parsed: Quota = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, quota);
    assert_eq!(parsed.max_rate(), 100);
    assert_eq!(parsed.window_secs(), 300);
}
