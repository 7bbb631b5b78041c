//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router sending every method and path to the reflector
//! - Wire up request tracing
//! - Bind server to listener with peer addresses recorded
//! - Guard each request so a panic becomes a 500, never a dropped connection

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use futures_util::FutureExt;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::EchoConfig;
use crate::http::request::{self, BodyLimits, RequestId};
use crate::http::response;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::reflect::{self, model::Response as Document, Pipeline};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub body_limits: BodyLimits,
}

/// HTTP server for the echo service.
pub struct HttpServer {
    router: Router,
    config: EchoConfig,
}

impl HttpServer {
    /// Create a new HTTP server running the standard pipeline.
    pub fn new(config: EchoConfig) -> Self {
        Self::with_pipeline(config, Pipeline::standard())
    }

    /// Create a server running a custom pipeline.
    pub fn with_pipeline(config: EchoConfig, pipeline: Pipeline) -> Self {
        let router = build_router(&config, Arc::new(pipeline));
        Self { router, config }
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EchoConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
///
/// The request timeout bounds the body read inside the handler rather than
/// wrapping the service, so an expired request still gets a JSON document.
pub fn build_router(config: &EchoConfig, pipeline: Arc<Pipeline>) -> Router {
    let state = AppState {
        pipeline,
        body_limits: BodyLimits {
            max_bytes: config.limits.max_body_bytes,
            timeout: Duration::from_secs(config.limits.request_timeout_secs),
        },
    };

    Router::new()
        .route("/", any(reflect_handler))
        .route("/{*path}", any(reflect_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Reflect one request, converting any panic into a 500.
async fn reflect_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = RequestId::new();
    let method = request.method().to_string();
    let span = tracing::info_span!("reflect", request_id = %request_id);

    let guarded = AssertUnwindSafe(reflect_request(state, request_id, request).instrument(span.clone()))
        .catch_unwind()
        .await;

    let response = match guarded {
        Ok(response) => response,
        Err(payload) => {
            let description = response::panic_description(payload.as_ref());
            span.in_scope(|| {
                tracing::warn!(
                    request_id = %request_id,
                    "an unrecoverable error occurred: '{}'",
                    description
                );
            });
            metrics::record_fault();
            response::fault_response(request_id, &description)
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start_time);
    response
}

async fn reflect_request(state: AppState, request_id: RequestId, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let mut document = Document::new(request_id.to_string());
    tracing::info!(request_id = %request_id, "received incoming request");

    let raw = request::capture(request, request_id, state.body_limits).await;
    let body = reflect::assemble(&state.pipeline, &raw, &mut document);
    let status = response::status_for(&document.errors);

    tracing::info!(
        request_id = %request_id,
        status = status.as_u16(),
        "sent response of size {} back to client after {:?}",
        response::format_size(body.len()),
        start_time.elapsed()
    );

    response::json_response(status, request_id, body)
}
