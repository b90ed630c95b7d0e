//! Unit tests for SMS gateway creation

use otp_shared::SmsConfig;

use crate::sms::create_sms_gateway;

fn config(provider: &str, api_url: &str) -> SmsConfig {
    SmsConfig {
        provider: provider.to_string(),
        api_url: api_url.to_string(),
        ..SmsConfig::default()
    }
}

#[test]
fn test_create_mock_gateway() {
    let gateway = create_sms_gateway(&config("mock", ""));
    assert_eq!(gateway.provider_name(), "mock");
}

#[test]
fn test_create_http_gateway() {
    let gateway = create_sms_gateway(&config("http", "http://localhost:9000/send"));
    assert_eq!(gateway.provider_name(), "http");
}

#[test]
fn test_http_without_url_falls_back_to_mock() {
    let gateway = create_sms_gateway(&config("http", "  "));
    assert_eq!(gateway.provider_name(), "mock");
}

#[test]
fn test_create_unknown_provider_fallback() {
    let gateway = create_sms_gateway(&config("carrier-pigeon", ""));
    assert_eq!(gateway.provider_name(), "mock");
}
