use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_shared::ApiResponse;

use crate::dto::OtpStatsQuery;
use crate::handlers::ApiError;

use super::AppState;

/// Handler for GET /api/otp/stats?phoneNumber=9876543210
///
/// Always 200 once the query is well-formed; store failures are reported as
/// "no pending code, can request".
pub async fn otp_stats(
    state: web::Data<AppState>,
    query: web::Query<OtpStatsQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;

    let stats = state.otp_service.get_otp_stats(&query.phone_number).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}
