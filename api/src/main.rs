use actix_web::{web, HttpServer};

use otp_api::config::{init_otp_service, init_tracing, load_config, spawn_cleanup_task};
use otp_api::{create_app, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);

    tracing::info!(environment = %config.environment, "Starting OTP API server");

    let otp_service = init_otp_service(&config).await?;

    if let Some(interval) = config.otp.cleanup_interval_seconds {
        tracing::info!(interval_seconds = interval, "Scheduling periodic OTP cleanup");
        spawn_cleanup_task(otp_service.clone(), interval);
    }

    let app_state = web::Data::new(AppState::new(otp_service));
    let bind_address = config.server.bind_address();
    tracing::info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(app_state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_address)?.run().await?;
    Ok(())
}
