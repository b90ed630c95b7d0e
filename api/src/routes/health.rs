use actix_web::{web, HttpResponse};
use chrono::Utc;

use otp_shared::{HealthResponse, HealthStatus};

use super::otp::AppState;

/// Handler for GET /health
///
/// 200 `healthy` when the OTP store answers, 503 `degraded` otherwise.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let status = if state.otp_service.store_available().await {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let body = HealthResponse {
        status,
        service: "otp-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    match status {
        HealthStatus::Healthy => HttpResponse::Ok().json(body),
        HealthStatus::Degraded => HttpResponse::ServiceUnavailable().json(body),
    }
}
