//! Server configuration module

use serde::{Deserialize, Serialize};

use super::parse_var;
use crate::errors::ConfigResult;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8080,
            workers: 0, // Use all CPU cores
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Read `SERVER_HOST`, `SERVER_PORT` (or `PORT`) and `SERVER_WORKERS`
    pub fn from_lookup<F>(lookup: &F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = match parse_var(lookup, "SERVER_PORT")? {
            Some(port) => port,
            None => parse_var(lookup, "PORT")?.unwrap_or(defaults.port),
        };
        Ok(Self {
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port,
            workers: parse_var(lookup, "SERVER_WORKERS")?.unwrap_or(defaults.workers),
        })
    }

    /// Address string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_bind_address() {
        assert_eq!(ServerConfig::new("0.0.0.0", 3000).bind_address(), "0.0.0.0:3000");
        assert_eq!(ServerConfig::default().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_server_port_fallback() {
        let lookup = |key: &str| (key == "PORT").then(|| "3000".to_string());
        assert_eq!(ServerConfig::from_lookup(&lookup).unwrap().port, 3000);

        let both = |key: &str| match key {
            "SERVER_PORT" => Some("9090".to_string()),
            "PORT" => Some("3000".to_string()),
            _ => None,
        };
        assert_eq!(ServerConfig::from_lookup(&both).unwrap().port, 9090);
    }
}
