//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check that addresses are well formed before the listener resolves them
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EchoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use crate::config::schema::EchoConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Port 0 would bind an ephemeral port nobody can find.
    ZeroPort,
    /// The listener address is neither an IP literal nor a hostname.
    InvalidServerAddr(String),
    /// A body limit of zero rejects every body.
    ZeroBodyLimit,
    /// A zero timeout fails every request.
    ZeroTimeout,
    /// The metrics listener address does not parse.
    InvalidMetricsAddress(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::ZeroPort => write!(f, "listener.server_port must be non-zero"),
            ValidationError::InvalidServerAddr(addr) => {
                write!(f, "listener.server_addr '{}' is not an IP address or hostname", addr)
            }
            ValidationError::ZeroBodyLimit => write!(f, "limits.max_body_bytes must be non-zero"),
            ValidationError::ZeroTimeout => {
                write!(f, "limits.request_timeout_secs must be non-zero")
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address '{}' is not a socket address", addr)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a configuration for semantic problems, collecting all of them.
pub fn validate_config(config: &EchoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.server_port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let addr = config.listener.server_addr.as_str();
    if addr.parse::<IpAddr>().is_err() && !is_hostname(addr) {
        errors.push(ValidationError::InvalidServerAddr(addr.to_string()));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// RFC 1123 hostname: dot-separated labels of letters, digits and inner hyphens.
fn is_hostname(name: &str) -> bool {
    let name = name.strip_suffix('.').unwrap_or(name);
    !name.is_empty()
        && name.len() <= 253
        && name.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}
