use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_shared::phone::mask_phone_number;
use otp_shared::ApiResponse;

use crate::dto::{SendOtpRequest, SendOtpResponse};
use crate::handlers::ApiError;

use super::AppState;

/// Handler for POST /api/otp/send
///
/// # Request Body
///
/// ```json
/// { "phoneNumber": "9876543210" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "data": {
///         "issued": true,
///         "message": "OTP sent successfully",
///         "phoneNumber": "9876543210",
///         "messageId": "mock_6f1c...",
///         "expiresInMinutes": 10,
///         "resendAfterSeconds": 60
///     },
///     "timestamp": "2025-08-14T10:00:00Z"
/// }
/// ```
///
/// ## Errors
///
/// Service failures carry `data: {"issued": false, "reason": <code>}`, plus
/// `retryAfterSeconds` when rate limited.
/// - 400 `INVALID_PHONE` / `VALIDATION_ERROR`
/// - 429 `RATE_LIMITED`, with `Retry-After` when the cooldown is known
/// - 502 `DELIVERY_FAILED`
/// - 500 `INTERNAL_ERROR`
pub async fn send_otp(
    state: web::Data<AppState>,
    request: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    issue(&state, request.into_inner(), false).await
}

/// Shared body of `send` and `resend`; only the service entry point and the
/// success message differ
pub(super) async fn issue(
    state: &AppState,
    request: SendOtpRequest,
    resend: bool,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    tracing::info!(
        phone = %mask_phone_number(&request.phone_number),
        resend,
        "Processing OTP issue request"
    );

    let (result, message) = if resend {
        (
            state.otp_service.resend_otp(&request.phone_number).await,
            "New OTP sent successfully",
        )
    } else {
        (
            state.otp_service.send_otp(&request.phone_number).await,
            "OTP sent successfully",
        )
    };
    let result = result.map_err(ApiError::issue)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(SendOtpResponse::new(
        message,
        request.phone_number,
        result,
    ))))
}
