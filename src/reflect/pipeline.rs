//! Ordered extraction pipeline.
//!
//! # Responsibilities
//! - Hold the raw view of one request (head, peer address, buffered body)
//! - Run each extraction step against the in-progress snapshot
//! - Collect every step error into the document's `errors` list
//!
//! # Design Decisions
//! - Steps are independent: a failing step never stops later steps
//! - Steps are synchronous; the only I/O (reading the body) happens before the pipeline runs
//! - Step order is fixed at construction; query runs before form so form can merge into it

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::request::Parts;

use crate::observability::metrics;
use crate::reflect::error::ReflectError;
use crate::reflect::model::{Request, Response};
use crate::reflect::{auth, body, cookies, form, headers, query, scalars};

/// Outcome of reading the request body into memory.
#[derive(Debug, Clone)]
pub enum BodyRead {
    /// The client sent no body bytes.
    Empty,
    /// The complete body.
    Bytes(Bytes),
    /// The stream failed or exceeded the size limit.
    Failed(String),
}

/// Everything the extraction steps may look at.
#[derive(Debug)]
pub struct RawRequest {
    pub request_id: String,
    pub parts: Parts,
    pub remote_addr: Option<SocketAddr>,
    pub body: BodyRead,
}

/// One independent extraction step.
pub trait Extractor: Send + Sync + std::fmt::Debug {
    /// Name used in log lines.
    fn name(&self) -> &'static str;

    /// Copy this step's facet of `raw` into `snapshot`.
    ///
    /// A step may both populate the snapshot and return an error.
    fn extract(&self, raw: &RawRequest, snapshot: &mut Request) -> Result<(), ReflectError>;
}

/// The fixed sequence of steps applied to every request.
#[derive(Debug)]
pub struct Pipeline {
    steps: Vec<Box<dyn Extractor>>,
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// The standard step order: scalars, headers, query, body, form, auth, cookies.
    pub fn standard() -> Self {
        Self::new()
            .with_step(scalars::Scalars)
            .with_step(headers::Headers)
            .with_step(query::Query)
            .with_step(body::JsonBody)
            .with_step(form::Form)
            .with_step(auth::BasicAuth)
            .with_step(cookies::Cookies)
    }

    /// Append a step.
    pub fn with_step(mut self, step: impl Extractor + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Run every step against `response.request`, recording failures in `response.errors`.
    pub fn run(&self, raw: &RawRequest, response: &mut Response) {
        for step in &self.steps {
            tracing::debug!(request_id = %raw.request_id, step = step.name(), "processing");
            if let Err(e) = step.extract(raw, &mut response.request) {
                tracing::warn!(request_id = %raw.request_id, step = step.name(), "...{}", e);
                metrics::record_soft_error(e.kind());
                response.errors.push(e.to_string());
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::http;

    /// Build a raw request the way the HTTP layer would.
    pub fn raw(request: http::Request<&'static str>) -> RawRequest {
        let (parts, body) = request.into_parts();
        let body = if body.is_empty() {
            BodyRead::Empty
        } else {
            BodyRead::Bytes(Bytes::from_static(body.as_bytes()))
        };
        RawRequest {
            request_id: "test".to_string(),
            parts,
            remote_addr: None,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::raw;
    use super::*;
    use axum::http;

    #[derive(Debug)]
    struct AlwaysFails;

    impl Extractor for AlwaysFails {
        fn name(&self) -> &'static str {
            "always_fails"
        }

        fn extract(&self, _raw: &RawRequest, _snapshot: &mut Request) -> Result<(), ReflectError> {
            Err(ReflectError::BodyRead("boom".into()))
        }
    }

    #[test]
    fn test_failing_step_does_not_stop_later_steps() {
        let pipeline = Pipeline::new()
            .with_step(AlwaysFails)
            .with_step(scalars::Scalars)
            .with_step(AlwaysFails);
        let raw = raw(http::Request::builder().uri("/x").body("").unwrap());
        let mut response = Response::new("id");

        pipeline.run(&raw, &mut response);

        assert_eq!(response.errors.len(), 2);
        assert_eq!(response.request.path.as_deref(), Some("/x"));
    }

    #[test]
    fn test_standard_pipeline_clean_request() {
        let raw = raw(
            http::Request::builder()
                .method("GET")
                .uri("/hello?a=1&b=2")
                .header("X-Test", "abc")
                .body("")
                .unwrap(),
        );
        let mut response = Response::new("id");

        Pipeline::standard().run(&raw, &mut response);

        assert!(response.errors.is_empty());
        let value = serde_json::to_value(&response.request).unwrap();
        assert_eq!(value["header"]["X-Test"], serde_json::json!(["abc"]));
        assert_eq!(value["query"], serde_json::json!({"a": "1", "b": "2"}));
        assert_eq!(value["body"], serde_json::Value::Null);
        assert_eq!(value["form"], serde_json::Value::Null);
    }
}
