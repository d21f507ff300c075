// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use crate::{ErrorKind, NetrecApplyOption, NetrecVerifyRetry};

#[test]
fn test_verify_retry_delay_capped() {
    let retry: NetrecVerifyRetry = serde_yaml::from_str(
        r"
        max-attempts: 6
        interval-ms: 100
        max-interval-ms: 300
        ",
    )
    .unwrap();
    assert_eq!(retry.delay(1), Duration::from_millis(100));
    assert_eq!(retry.delay(2), Duration::from_millis(200));
    assert_eq!(retry.delay(3), Duration::from_millis(300));
    assert_eq!(retry.delay(5), Duration::from_millis(300));
    assert_eq!(retry.budget(), Duration::from_millis(1200));
}

#[test]
fn test_verify_retry_budget_saturate() {
    let retry: NetrecVerifyRetry = serde_yaml::from_str(&format!(
        "
        max-attempts: 3000
        interval-ms: {}
        max-interval-ms: {}
        ",
        u64::MAX,
        u64::MAX
    ))
    .unwrap();
    assert_eq!(retry.budget(), Duration::MAX);
}

#[test]
fn test_apply_option_huge_verify_interval() {
    let retry: NetrecVerifyRetry = serde_yaml::from_str(&format!(
        "
        max-attempts: 50
        interval-ms: {}
        max-interval-ms: {}
        ",
        u64::MAX,
        u64::MAX
    ))
    .unwrap();
    let result = NetrecApplyOption::new().verify_retry(retry).validate();
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e.msg().starts_with("commit-timeout-ms:"));
    }
}

#[test]
fn test_apply_option_too_many_verify_attempts() {
    let opt: NetrecApplyOption = serde_yaml::from_str(&format!(
        "
        commit-timeout-ms: 60000
        verify-retry:
          max-attempts: 3000
          interval-ms: {}
          max-interval-ms: {}
        ",
        u64::MAX,
        u64::MAX
    ))
    .unwrap();
    let result = opt.validate();
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e.msg().starts_with("verify-retry.max-attempts:"));
    }
}

#[test]
fn test_apply_option_no_verify_ignore_budget() {
    let opt: NetrecApplyOption = serde_yaml::from_str(
        r"
        commit-timeout-ms: 100
        no-verify: true
        verify-retry:
          max-attempts: 10
          interval-ms: 1000
        ",
    )
    .unwrap();
    assert!(opt.validate().is_ok());
}
