//! Delivery gateway configuration

use serde::{Deserialize, Serialize};

use super::parse_var;
use crate::errors::ConfigResult;

/// How the HTTP SMS API expects requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsApiMethod {
    /// JSON body with a bearer key
    Post,
    /// Query parameters `phone`, `message` and `apikey`
    Get,
}

impl std::str::FromStr for SmsApiMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "post" => Ok(SmsApiMethod::Post),
            "get" => Ok(SmsApiMethod::Get),
            _ => Err(format!("Invalid SMS API method: {}", s)),
        }
    }
}

/// SMS service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// SMS service provider ("http", "mock")
    pub provider: String,

    /// Endpoint of the HTTP SMS API
    pub api_url: String,

    /// Request style of the HTTP SMS API
    pub api_method: SmsApiMethod,

    /// Bearer token for the HTTP SMS API
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Client-side request timeout for the HTTP SMS API
    pub request_timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            api_url: "http://localhost:9000/send".to_string(),
            api_method: SmsApiMethod::Post,
            api_key: String::new(),
            request_timeout_secs: 10,
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Read `SMS_PROVIDER`, `SMS_API_URL`, `SMS_API_METHOD`, `SMS_API_KEY` and
    /// `SMS_TIMEOUT_SECS`
    pub fn from_lookup<F>(lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            provider: lookup("SMS_PROVIDER")
                .map(|p| p.trim().to_lowercase())
                .unwrap_or(defaults.provider),
            api_url: lookup("SMS_API_URL").unwrap_or(defaults.api_url),
            api_method: parse_var(lookup, "SMS_API_METHOD")?.unwrap_or(defaults.api_method),
            api_key: lookup("SMS_API_KEY").unwrap_or_default(),
            request_timeout_secs: parse_var(lookup, "SMS_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
        })
    }
}
