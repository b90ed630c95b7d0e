//! Startup wiring: configuration loading, logging, store and gateway selection

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use otp_core::{
    initialize_otp_service, CacheStoreTrait, OtpServiceConfig, SharedOtpService,
};
use otp_infra::cache::{InMemoryStore, RedisClient};
use otp_infra::sms::create_sms_gateway;
use otp_shared::{AppConfig, CacheBackend, CacheConfig, LogFormat, LoggingConfig};

/// Load `.env` (if present) and the process environment
pub fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();
    AppConfig::from_env().context("Failed to load configuration")
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    if let Err(e) = result {
        eprintln!("Tracing subscriber already installed: {}", e);
    }
}

/// Connect the configured store backend
pub async fn build_store(cache: &CacheConfig) -> anyhow::Result<Arc<dyn CacheStoreTrait>> {
    match cache.backend {
        CacheBackend::Redis => {
            let client = RedisClient::new(cache)
                .await
                .context("Failed to connect to Redis")?;
            Ok(Arc::new(client))
        }
        CacheBackend::Memory => {
            tracing::warn!("Using in-memory OTP store; codes are lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

/// Build the store and gateway, then install the process-wide OTP service
pub async fn init_otp_service(config: &AppConfig) -> anyhow::Result<SharedOtpService> {
    let service_config = OtpServiceConfig::from_settings(&config.otp, config.environment)?;
    let store = build_store(&config.cache).await?;
    let sms_gateway = create_sms_gateway(&config.sms);

    tracing::info!(
        environment = %config.environment,
        backend = ?config.cache.backend,
        provider = sms_gateway.provider_name(),
        expiry_minutes = service_config.expiry_minutes,
        rate_limit_seconds = service_config.rate_limit_seconds,
        rate_limit_mode = ?service_config.rate_limit_mode,
        "Initializing OTP service"
    );
    if service_config.expose_code {
        tracing::warn!("OTP codes are included in send responses");
    }

    Ok(initialize_otp_service(sms_gateway, store, service_config)?)
}

/// Run `cleanup_expired_otps` on a fixed interval until the runtime shuts down
pub fn spawn_cleanup_task(service: SharedOtpService, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let cleaned = service.cleanup_expired_otps().await;
            tracing::debug!(cleaned, "Periodic OTP cleanup finished");
        }
    });
}
