//! Application factory
//!
//! Builds the Actix-web application around a shared OTP service.

use actix_web::{web, App};
use tracing_actix_web::TracingLogger;

use crate::handlers::{json_error_handler, not_found, query_error_handler};
use crate::routes::health::health_check;
use crate::routes::otp::{
    resend::resend_otp, send::send_otp, stats::otp_stats, verify::verify_otp, AppState,
};

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(configure_otp_routes())
        .default_service(web::route().to(not_found))
}

/// Routes under `/api/otp`
pub fn configure_otp_routes() -> actix_web::Scope {
    web::scope("/api/otp")
        .route("/send", web::post().to(send_otp))
        .route("/resend", web::post().to(resend_otp))
        .route("/verify", web::post().to(verify_otp))
        .route("/stats", web::get().to(otp_stats))
}
