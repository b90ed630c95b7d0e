//! Unit tests for the OTP service

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::OtpError;
use crate::services::otp::{
    otp_key, rate_limit_key, OtpService, OtpServiceConfig, OtpStats, RateLimitMode,
};

use super::mocks::{GatewayBehavior, MockCacheStore, MockSmsGateway};

const PHONE: &str = "9876543210";

type TestService = OtpService<MockSmsGateway, MockCacheStore>;

fn setup(config: OtpServiceConfig) -> (TestService, Arc<MockSmsGateway>, Arc<MockCacheStore>) {
    let gateway = Arc::new(MockSmsGateway::new());
    let store = Arc::new(MockCacheStore::new());
    let service = OtpService::new(gateway.clone(), store.clone(), config).unwrap();
    (service, gateway, store)
}

fn assert_rolled_back(store: &MockCacheStore) {
    assert!(store.peek(&otp_key(PHONE)).is_none());
    assert!(store.peek(&rate_limit_key(PHONE)).is_none());
}

#[test]
fn test_generate_code_is_six_digits_in_range() {
    for _ in 0..1000 {
        let code = TestService::generate_code();
        assert_eq!(code.len(), 6);
        let value: u32 = code.parse().unwrap();
        assert!((100_000..=999_999).contains(&value));
    }
}

#[test]
fn test_generate_code_varies() {
    let codes: HashSet<String> = (0..50).map(|_| TestService::generate_code()).collect();
    assert!(codes.len() > 1);
}

#[test]
fn test_generate_code_covers_every_leading_digit() {
    let mut leading = [0usize; 10];
    for _ in 0..10_000 {
        let code = TestService::generate_code();
        let digit = code.as_bytes()[0] - b'0';
        leading[digit as usize] += 1;
    }

    assert_eq!(leading[0], 0);
    for (digit, count) in leading.iter().enumerate().skip(1) {
        // Expected about 1111 each
        assert!(*count > 500, "leading digit {} drawn {} times", digit, count);
    }
}

#[test]
fn test_new_rejects_invalid_config() {
    let gateway = Arc::new(MockSmsGateway::new());
    let store = Arc::new(MockCacheStore::new());
    let config = OtpServiceConfig {
        rate_limit_seconds: 0,
        ..OtpServiceConfig::default()
    };

    let result = OtpService::new(gateway, store, config);
    assert!(matches!(result, Err(OtpError::InvalidConfiguration { .. })));
}

#[tokio::test]
async fn test_send_otp_success() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());

    let result = service.send_otp(PHONE).await.unwrap();

    assert_eq!(result.expires_in_minutes, 10);
    assert_eq!(result.resend_after_seconds, 60);
    assert_eq!(result.message_id.as_deref(), Some("mock_0"));
    assert!(result.debug_code.is_none());

    let (sent_to, message) = gateway.last_message().unwrap();
    assert_eq!(sent_to, PHONE);
    let code = gateway.last_code().unwrap();
    assert_eq!(message, format!("Your OTP is {}. Valid for 10 minutes.", code));

    assert_eq!(store.peek(&otp_key(PHONE)), Some(code));
    assert_eq!(store.peek(&rate_limit_key(PHONE)).as_deref(), Some("1"));
}

#[tokio::test]
async fn test_send_otp_exposes_code_when_configured() {
    let (service, gateway, _store) = setup(OtpServiceConfig {
        expose_code: true,
        ..OtpServiceConfig::default()
    });

    let result = service.send_otp(PHONE).await.unwrap();
    assert_eq!(result.debug_code, gateway.last_code());
}

#[tokio::test]
async fn test_send_otp_invalid_phone() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());

    for phone in ["", "12345", "5876543210", "+919876543210", "98765432101", "98765a3210"] {
        let result = service.send_otp(phone).await;
        assert_eq!(result.unwrap_err(), OtpError::InvalidPhone, "phone {:?}", phone);
    }

    assert_eq!(gateway.sent_count(), 0);
    assert!(store.entries.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_send_otp_rate_limited_within_cooldown() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    let first_code = store.peek(&otp_key(PHONE));

    tokio::time::advance(Duration::from_secs(20)).await;

    let err = service.send_otp(PHONE).await.unwrap_err();
    match err {
        OtpError::RateLimited { retry_after_seconds } => {
            assert_eq!(retry_after_seconds, Some(40));
        }
        other => panic!("Expected rate limit error, got {:?}", other),
    }

    // The pending code is untouched and nothing else went out
    assert_eq!(gateway.sent_count(), 1);
    assert_eq!(store.peek(&otp_key(PHONE)), first_code);
}

#[tokio::test(start_paused = true)]
async fn test_send_otp_allowed_after_cooldown() {
    let (service, gateway, _store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;

    assert!(service.send_otp(PHONE).await.is_ok());
    assert_eq!(gateway.sent_count(), 2);
}

#[tokio::test]
async fn test_resend_shares_the_rate_limit() {
    let (service, _gateway, _store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    let err = service.resend_otp(PHONE).await.unwrap_err();
    assert!(matches!(err, OtpError::RateLimited { .. }));
}

#[tokio::test]
async fn test_rate_limit_is_per_phone() {
    let (service, _gateway, _store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    assert!(service.send_otp("8123456789").await.is_ok());
}

#[tokio::test]
async fn test_concurrent_sends_only_one_passes_atomic_gate() {
    let (service, gateway, _store) = setup(OtpServiceConfig::default());

    let (a, b) = tokio::join!(service.send_otp(PHONE), service.send_otp(PHONE));

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    assert_eq!(gateway.sent_count(), 1);
}

#[tokio::test]
async fn test_send_otp_read_then_write_mode() {
    let (service, _gateway, store) = setup(OtpServiceConfig {
        rate_limit_mode: RateLimitMode::ReadThenWrite,
        ..OtpServiceConfig::default()
    });

    service.send_otp(PHONE).await.unwrap();
    assert_eq!(store.peek(&rate_limit_key(PHONE)).as_deref(), Some("1"));
    assert!(store.peek(&otp_key(PHONE)).is_some());

    let err = service.send_otp(PHONE).await.unwrap_err();
    assert!(matches!(err, OtpError::RateLimited { retry_after_seconds: Some(_) }));
}

#[tokio::test]
async fn test_send_otp_delivery_rejected_rolls_back() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());
    gateway.set_behavior(GatewayBehavior::Reject("SMS_API_ERROR".to_string()));

    let err = service.send_otp(PHONE).await.unwrap_err();
    assert_eq!(
        err,
        OtpError::DeliveryFailed {
            reason: Some("SMS_API_ERROR".to_string())
        }
    );
    assert_rolled_back(&store);

    // Not rate limited after a failed delivery
    gateway.set_behavior(GatewayBehavior::Deliver);
    assert!(service.send_otp(PHONE).await.is_ok());
}

#[tokio::test]
async fn test_send_otp_gateway_fault_is_internal() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());
    gateway.set_behavior(GatewayBehavior::Fault);

    let err = service.send_otp(PHONE).await.unwrap_err();
    assert!(matches!(err, OtpError::Internal { .. }));
    assert_rolled_back(&store);
}

#[tokio::test(start_paused = true)]
async fn test_send_otp_delivery_timeout() {
    let (service, gateway, store) = setup(OtpServiceConfig {
        delivery_timeout: Duration::from_secs(5),
        ..OtpServiceConfig::default()
    });
    gateway.set_behavior(GatewayBehavior::Hang);

    let err = service.send_otp(PHONE).await.unwrap_err();
    assert_eq!(
        err,
        OtpError::DeliveryFailed {
            reason: Some("TIMEOUT".to_string())
        }
    );
    assert_rolled_back(&store);
}

#[tokio::test]
async fn test_send_otp_store_write_failure() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());
    store.fail_op("set_with_expiry");

    let err = service.send_otp(PHONE).await.unwrap_err();
    assert!(matches!(err, OtpError::Internal { .. }));
    assert_eq!(gateway.sent_count(), 0);
    // The claimed marker is released
    assert_rolled_back(&store);
}

#[tokio::test]
async fn test_send_otp_store_unreachable() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());
    store.fail_op("set_if_absent_with_expiry");

    let err = service.send_otp(PHONE).await.unwrap_err();
    assert!(matches!(err, OtpError::Internal { .. }));
    assert_eq!(gateway.sent_count(), 0);
}

#[tokio::test]
async fn test_rollback_deletes_are_independent() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());
    gateway.set_behavior(GatewayBehavior::Reject("SMS_API_ERROR".to_string()));
    store.fail_delete_of(&otp_key(PHONE));

    let err = service.send_otp(PHONE).await.unwrap_err();
    assert!(matches!(err, OtpError::DeliveryFailed { .. }));

    // The marker is gone even though the code record could not be removed
    assert!(store.peek(&rate_limit_key(PHONE)).is_none());
    assert!(store.peek(&otp_key(PHONE)).is_some());
}

#[tokio::test]
async fn test_verify_otp_success_consumes_code() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    let code = gateway.last_code().unwrap();

    assert_eq!(service.verify_otp(PHONE, &code).await, Ok(()));
    assert_rolled_back(&store);

    // Single use
    assert_eq!(
        service.verify_otp(PHONE, &code).await,
        Err(OtpError::NotFoundOrExpired)
    );
}

#[tokio::test]
async fn test_verify_success_clears_rate_limit() {
    let (service, gateway, _store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    let code = gateway.last_code().unwrap();
    service.verify_otp(PHONE, &code).await.unwrap();

    assert!(service.send_otp(PHONE).await.is_ok());
}

#[tokio::test]
async fn test_verify_mismatch_keeps_code() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    let code = gateway.last_code().unwrap();
    let wrong = if code == "123456" { "654321" } else { "123456" };

    assert_eq!(service.verify_otp(PHONE, wrong).await, Err(OtpError::Mismatch));
    assert_eq!(store.peek(&otp_key(PHONE)), Some(code.clone()));

    // Retry with the right code still works
    assert_eq!(service.verify_otp(PHONE, &code).await, Ok(()));
}

#[tokio::test]
async fn test_verify_invalid_inputs() {
    let (service, _gateway, _store) = setup(OtpServiceConfig::default());

    assert_eq!(
        service.verify_otp("12345", "123456").await,
        Err(OtpError::InvalidPhone)
    );
    for code in ["", "12345", "1234567", "12a456", " 123456"] {
        assert_eq!(
            service.verify_otp(PHONE, code).await,
            Err(OtpError::InvalidCodeFormat),
            "code {:?}",
            code
        );
    }
}

#[tokio::test]
async fn test_verify_compares_codes_as_strings() {
    let (service, _gateway, store) = setup(OtpServiceConfig::default());
    store.insert_persistent(&otp_key(PHONE), "012345");

    assert_eq!(
        service.verify_otp(PHONE, "12345").await,
        Err(OtpError::InvalidCodeFormat)
    );
    assert_eq!(service.verify_otp(PHONE, "012346").await, Err(OtpError::Mismatch));
    assert_eq!(service.verify_otp(PHONE, "012345").await, Ok(()));
    assert!(store.peek(&otp_key(PHONE)).is_none());
}

#[tokio::test]
async fn test_verify_without_pending_code() {
    let (service, _gateway, _store) = setup(OtpServiceConfig::default());

    assert_eq!(
        service.verify_otp(PHONE, "123456").await,
        Err(OtpError::NotFoundOrExpired)
    );
}

#[tokio::test(start_paused = true)]
async fn test_verify_after_expiry() {
    let (service, gateway, _store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    let code = gateway.last_code().unwrap();

    tokio::time::advance(Duration::from_secs(10 * 60 + 1)).await;

    assert_eq!(
        service.verify_otp(PHONE, &code).await,
        Err(OtpError::NotFoundOrExpired)
    );
}

#[tokio::test]
async fn test_verify_lost_consume_race() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    let code = gateway.last_code().unwrap();
    store.lose_delete_races();

    assert_eq!(
        service.verify_otp(PHONE, &code).await,
        Err(OtpError::NotFoundOrExpired)
    );
}

#[tokio::test]
async fn test_verify_succeeds_when_marker_clear_fails() {
    let (service, gateway, store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    let code = gateway.last_code().unwrap();
    store.fail_delete_of(&rate_limit_key(PHONE));

    assert_eq!(service.verify_otp(PHONE, &code).await, Ok(()));
    assert!(store.peek(&otp_key(PHONE)).is_none());
}

#[tokio::test]
async fn test_verify_store_failure_is_internal() {
    let (service, _gateway, store) = setup(OtpServiceConfig::default());
    store.fail_op("get");

    let err = service.verify_otp(PHONE, "123456").await.unwrap_err();
    assert!(matches!(err, OtpError::Internal { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_get_otp_stats_lifecycle() {
    let (service, gateway, _store) = setup(OtpServiceConfig::default());

    assert_eq!(service.get_otp_stats(PHONE).await, OtpStats::fail_open());

    service.send_otp(PHONE).await.unwrap();
    tokio::time::advance(Duration::from_secs(15)).await;

    let stats = service.get_otp_stats(PHONE).await;
    assert!(stats.has_pending_code);
    assert!(!stats.can_issue_now);
    assert_eq!(stats.retry_after_seconds, Some(45));

    // Cooldown ends before the code expires
    tokio::time::advance(Duration::from_secs(46)).await;
    let stats = service.get_otp_stats(PHONE).await;
    assert!(stats.has_pending_code);
    assert!(stats.can_issue_now);
    assert_eq!(stats.retry_after_seconds, None);

    let code = gateway.last_code().unwrap();
    service.verify_otp(PHONE, &code).await.unwrap();
    let stats = service.get_otp_stats(PHONE).await;
    assert!(!stats.has_pending_code);
    assert!(stats.can_issue_now);
}

#[tokio::test]
async fn test_get_otp_stats_fails_open() {
    let (service, _gateway, store) = setup(OtpServiceConfig::default());
    service.send_otp(PHONE).await.unwrap();
    store.fail_op("ttl");

    assert_eq!(service.get_otp_stats(PHONE).await, OtpStats::fail_open());
}

#[tokio::test]
async fn test_get_otp_stats_does_not_write() {
    let (service, _gateway, store) = setup(OtpServiceConfig::default());

    service.get_otp_stats(PHONE).await;
    service.get_otp_stats("not-a-phone").await;
    assert!(store.entries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cleanup_removes_only_records_without_expiry() {
    let (service, _gateway, store) = setup(OtpServiceConfig::default());

    service.send_otp(PHONE).await.unwrap();
    store.insert_persistent(&otp_key("8123456789"), "111111");
    store.insert_persistent(&otp_key("7123456789"), "222222");
    store.insert_persistent("unrelated", "keep");

    assert_eq!(service.cleanup_expired_otps().await, 2);

    assert!(store.peek(&otp_key(PHONE)).is_some());
    assert!(store.peek(&otp_key("8123456789")).is_none());
    assert!(store.peek(&otp_key("7123456789")).is_none());
    assert_eq!(store.peek("unrelated").as_deref(), Some("keep"));

    assert_eq!(service.cleanup_expired_otps().await, 0);
}

#[tokio::test]
async fn test_store_available_reflects_ping() {
    let (service, _gateway, store) = setup(OtpServiceConfig::default());
    assert!(service.store_available().await);

    store.fail_op("ping");
    assert!(!service.store_available().await);
}

#[tokio::test]
async fn test_cleanup_swallows_store_errors() {
    let (service, _gateway, store) = setup(OtpServiceConfig::default());
    store.insert_persistent(&otp_key(PHONE), "111111");
    store.fail_op("scan_prefix");

    assert_eq!(service.cleanup_expired_otps().await, 0);
    assert!(store.peek(&otp_key(PHONE)).is_some());
}
