use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_shared::phone::mask_phone_number;
use otp_shared::ApiResponse;

use crate::dto::{VerifyOtpRequest, VerifyOtpResponse};
use crate::handlers::ApiError;

use super::AppState;

/// Handler for POST /api/otp/verify
///
/// # Request Body
///
/// ```json
/// { "phoneNumber": "9876543210", "otp": "123456" }
/// ```
///
/// ## Errors
///
/// Service failures carry `data: {"verified": false, "reason": <code>}`.
/// - 400 `INVALID_PHONE`, `INVALID_CODE_FORMAT`, `NOT_FOUND_OR_EXPIRED`,
///   `MISMATCH` or `VALIDATION_ERROR`
/// - 500 `INTERNAL_ERROR`
pub async fn verify_otp(
    state: web::Data<AppState>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    request.validate()?;

    tracing::info!(
        phone = %mask_phone_number(&request.phone_number),
        "Processing verify_otp request"
    );

    state
        .otp_service
        .verify_otp(&request.phone_number, &request.otp)
        .await
        .map_err(ApiError::verify)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(VerifyOtpResponse {
        message: "OTP verified successfully".to_string(),
        verified: true,
    })))
}
