//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the echo server.
//! All types derive Serde traits for deserialization from config files.

use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};

/// Root configuration for the echo server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EchoConfig {
    /// Listener configuration (bind address and port).
    pub listener: ListenerConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl EchoConfig {
    /// Render the `addr:port` pair the listener binds to.
    ///
    /// IPv6 literals are bracketed; hostnames are left for the listener to resolve.
    pub fn bind_address(&self) -> String {
        let ListenerConfig { server_addr, server_port } = &self.listener;
        if server_addr.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{}", server_addr, server_port)
        } else {
            format!("{}:{}", server_addr, server_port)
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// IP address or hostname to bind to.
    pub server_addr: String,

    /// Port to listen on.
    pub server_port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0".to_string(),
            server_port: 8888,
        }
    }
}

/// Limits applied while reading a request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum number of body bytes read into memory.
    pub max_body_bytes: usize,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024, // 10MB
            request_timeout_secs: 30,
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines for terminals.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub log_filter: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "echoserver=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_bind_all_interfaces() {
        let config = EchoConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8888");
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_bind_address_brackets_ipv6() {
        let mut config = EchoConfig::default();
        config.listener.server_addr = "::1".into();
        assert_eq!(config.bind_address(), "[::1]:8888");

        config.listener.server_addr = "echo.internal".into();
        assert_eq!(config.bind_address(), "echo.internal:8888");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EchoConfig = toml::from_str(
            r#"
            [listener]
            server_port = 9000

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.server_addr, "0.0.0.0");
        assert_eq!(config.listener.server_port, 9000);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.limits.request_timeout_secs, 30);
    }
}
