//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! reflector and server produce:
//!     → logging.rs (structured log events keyed by request_id)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line as a structured field
//! - Metrics are cheap and disabled unless configured

pub mod logging;
pub mod metrics;
