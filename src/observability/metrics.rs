//! Metrics collection and exposition.
//!
//! # Metrics
//! - `echo_requests_total` (counter): reflected requests by method, status
//! - `echo_request_duration_seconds` (histogram): handling latency by method, status
//! - `echo_soft_errors_total` (counter): recorded soft errors by kind
//! - `echo_faults_total` (counter): requests answered by the fault guard
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one reflected request.
pub fn record_request(method: &str, status: u16, start_time: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!("echo_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    metrics::histogram!("echo_request_duration_seconds", "method" => method, "status" => status)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record one soft error appended to a response.
pub fn record_soft_error(kind: &'static str) {
    metrics::counter!("echo_soft_errors_total", "kind" => kind).increment(1);
}

/// Record one request answered by the fault guard.
pub fn record_fault() {
    metrics::counter!("echo_faults_total").increment(1);
}
