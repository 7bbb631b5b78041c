//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Route panics through the subscriber so faults carry request context
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config and environment (`RUST_LOG` wins)

use std::backtrace::Backtrace;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global tracing subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_ansi(false))
            .init(),
    }
}

/// Log every panic, with a backtrace, through tracing.
///
/// The hook runs on the panicking task before unwinding, so the event is
/// emitted inside the request span and carries its `request_id`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = Backtrace::force_capture();
        tracing::error!(
            panic = %info,
            backtrace = %backtrace,
            "an unrecoverable error occurred"
        );
    }));
}
