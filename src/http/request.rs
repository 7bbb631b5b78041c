//! Request intake.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) before any processing
//! - Capture the peer address recorded by the listener
//! - Buffer the body once, bounded by the configured limit and timeout
//!
//! # Design Decisions
//! - The ID is always freshly generated; an inbound `x-request-id` is reflected
//!   as an ordinary header, never reused
//! - A body read failure is a value, not an error, so the pipeline can report it

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderName, Request},
};
use uuid::Uuid;

use crate::reflect::{BodyRead, RawRequest};

/// Response header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Unique identifier of one reflected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Bounds applied while buffering a request body.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimits {
    pub max_bytes: usize,
    pub timeout: Duration,
}

/// Split a request into the raw view the pipeline reads.
pub async fn capture(request: Request<Body>, request_id: RequestId, limits: BodyLimits) -> RawRequest {
    let (parts, body) = request.into_parts();
    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    tracing::debug!(request_id = %request_id, "processing request body...");
    let body = read_body(body, limits).await;

    RawRequest {
        request_id: request_id.to_string(),
        parts,
        remote_addr,
        body,
    }
}

/// Read the whole body into memory within `limits`.
///
/// A client that stalls mid-body is cut off at the timeout and reported as a
/// read failure, so it still receives a JSON document.
pub async fn read_body(body: Body, limits: BodyLimits) -> BodyRead {
    match tokio::time::timeout(limits.timeout, axum::body::to_bytes(body, limits.max_bytes)).await {
        Ok(Ok(bytes)) if bytes.is_empty() => BodyRead::Empty,
        Ok(Ok(bytes)) => BodyRead::Bytes(bytes),
        Ok(Err(e)) => BodyRead::Failed(e.to_string()),
        Err(_) => BodyRead::Failed(format!(
            "timed out after {:?} waiting for the request body",
            limits.timeout
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use futures_util::stream;
    use std::collections::HashSet;

    fn limits(max_bytes: usize) -> BodyLimits {
        BodyLimits {
            max_bytes,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_request_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| RequestId::new().to_string()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.len() == 36));
    }

    #[tokio::test]
    async fn test_read_body_variants() {
        assert!(matches!(read_body(Body::empty(), limits(16)).await, BodyRead::Empty));

        match read_body(Body::from("hello"), limits(16)).await {
            BodyRead::Bytes(bytes) => assert_eq!(&bytes[..], b"hello"),
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            read_body(Body::from("far too long for the limit"), limits(4)).await,
            BodyRead::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_capture_reads_peer_address() {
        let addr: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));

        let raw = capture(request, RequestId::new(), limits(1024)).await;

        assert_eq!(raw.remote_addr, Some(addr));
        assert!(matches!(raw.body, BodyRead::Empty));
    }

    #[tokio::test]
    async fn test_stalled_body_times_out_as_read_failure() {
        let stalled = Body::from_stream(stream::pending::<Result<Bytes, std::io::Error>>());
        let limits = BodyLimits {
            max_bytes: 1024,
            timeout: Duration::from_millis(50),
        };

        match read_body(stalled, limits).await {
            BodyRead::Failed(cause) => assert!(cause.contains("timed out"), "{}", cause),
            other => panic!("unexpected {:?}", other),
        }
    }
}
