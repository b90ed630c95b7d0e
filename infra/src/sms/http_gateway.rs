//! HTTP SMS Gateway Implementation
//!
//! Delivers messages by POSTing `{ "phone", "message" }` as JSON to a
//! configured endpoint, authenticated with a bearer key. With
//! `SMS_API_METHOD=get` the same fields plus `apikey` go in the query string
//! instead. The endpoint answers `{ "success": true, "messageId": "..." }` on
//! acceptance.
//!
//! Numbers are sent in 10-digit national form; a leading `+91` or `91`
//! country prefix is stripped first.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use otp_core::{DeliveryReport, SmsGatewayTrait};
use otp_shared::phone::{mask_phone_number, validate_phone};
use otp_shared::{SmsApiMethod, SmsConfig};

use crate::InfrastructureError;

/// Endpoint rejected the request or answered with an error status
pub const SMS_API_ERROR: &str = "SMS_API_ERROR";
/// No response from the endpoint
pub const SMS_NETWORK_ERROR: &str = "SMS_NETWORK_ERROR";
/// Request could not be built or sent for another reason
pub const SMS_SEND_ERROR: &str = "SMS_SEND_ERROR";
/// Number is not a 10-digit mobile number after prefix stripping
pub const INVALID_PHONE_FORMAT: &str = "INVALID_PHONE_FORMAT";

const COUNTRY_PREFIX: &str = "91";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    phone: &'a str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct SendQuery<'a> {
    phone: &'a str,
    message: &'a str,
    apikey: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendReply {
    #[serde(default)]
    success: bool,
    message_id: Option<String>,
    id: Option<String>,
    message: Option<String>,
}

/// SMS gateway backed by an HTTP endpoint
pub struct HttpSmsGateway {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    method: SmsApiMethod,
}

impl HttpSmsGateway {
    /// Create a gateway from configuration
    ///
    /// Fails when no endpoint URL is configured or the HTTP client cannot be built.
    pub fn new(config: &SmsConfig) -> Result<Self, InfrastructureError> {
        let api_url = config.api_url.trim();
        if api_url.is_empty() {
            return Err(InfrastructureError::Config(
                "SMS_API_URL must be set for the http provider".to_string(),
            ));
        }
        if config.api_key.is_empty() {
            warn!("SMS_API_KEY is empty; requests will be sent without credentials");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(api_url, method = ?config.api_method, "HTTP SMS gateway initialized");

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: config.api_key.clone(),
            method: config.api_method,
        })
    }

    fn classify_transport_error(e: &reqwest::Error) -> &'static str {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            SMS_NETWORK_ERROR
        } else {
            SMS_SEND_ERROR
        }
    }
}

/// Reduce a number to its 10-digit national form
///
/// Accepts the bare number or one prefixed with `91` / `+91`. Returns `None`
/// when the result is not a valid mobile number.
pub fn normalize_phone_number(phone: &str) -> Option<String> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let national = match digits.strip_prefix(COUNTRY_PREFIX) {
        Some(rest) if rest.len() == 10 => rest,
        _ if phone.starts_with('+') => return None,
        _ => digits,
    };
    validate_phone(national).then(|| national.to_string())
}

#[async_trait]
impl SmsGatewayTrait for HttpSmsGateway {
    async fn send(&self, phone: &str, message: &str) -> Result<DeliveryReport, String> {
        let Some(national) = normalize_phone_number(phone) else {
            error!(
                provider = "http",
                phone = %mask_phone_number(phone),
                "Invalid phone number format"
            );
            return Ok(DeliveryReport::failed(INVALID_PHONE_FORMAT));
        };

        debug!(provider = "http", phone = %mask_phone_number(&national), "Sending SMS");

        let request = match self.method {
            SmsApiMethod::Post => self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&SendRequest {
                    phone: &national,
                    message,
                }),
            SmsApiMethod::Get => self.client.get(&self.api_url).query(&SendQuery {
                phone: &national,
                message,
                apikey: &self.api_key,
            }),
        };
        let response = request.send().await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                let code = Self::classify_transport_error(&e);
                error!(
                    provider = "http",
                    phone = %mask_phone_number(&national),
                    error = %e,
                    error_code = code,
                    "SMS request failed"
                );
                return Ok(DeliveryReport::failed(code));
            }
        };

        let status = response.status();
        let reply = response.json::<SendReply>().await.unwrap_or_default();

        // GET endpoints signal acceptance by status alone
        let accepted = match self.method {
            SmsApiMethod::Post => status.is_success() && reply.success,
            SmsApiMethod::Get => status.is_success(),
        };
        if !accepted {
            error!(
                provider = "http",
                phone = %mask_phone_number(&national),
                status = status.as_u16(),
                reply_message = ?reply.message,
                "SMS API rejected the message"
            );
            return Ok(DeliveryReport::failed(SMS_API_ERROR));
        }

        let message_id = reply
            .message_id
            .or(reply.id)
            .unwrap_or_else(|| "unknown".to_string());

        info!(
            target: "sms_gateway",
            provider = "http",
            phone = %mask_phone_number(&national),
            message_id = %message_id,
            "SMS sent successfully"
        );

        Ok(DeliveryReport::delivered(message_id))
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}
