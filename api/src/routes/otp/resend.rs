use actix_web::{web, HttpResponse};

use crate::dto::SendOtpRequest;
use crate::handlers::ApiError;

use super::send::issue;
use super::AppState;

/// Handler for POST /api/otp/resend
///
/// Same request body, cooldown and error contract as `/api/otp/send`.
pub async fn resend_otp(
    state: web::Data<AppState>,
    request: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    issue(&state, request.into_inner(), true).await
}
