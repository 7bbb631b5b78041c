//! Response writing.
//!
//! # Responsibilities
//! - Choose the status from the recorded soft errors
//! - Attach the JSON content type and the request ID header
//! - Build the minimal body sent when the fault guard fires
//! - Scale byte counts for the informational send log

use std::any::Any;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

use crate::http::request::{RequestId, X_REQUEST_ID};
use crate::reflect;

/// Content type of every reflected response.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const SIZE_UNITS: [&str; 5] = ["bytes", "kb", "Mb", "Gb", "Tb"];

/// 200 when nothing went wrong, 422 when any soft error was recorded.
pub fn status_for(errors: &[String]) -> StatusCode {
    if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

/// Wrap an encoded document in an HTTP response.
pub fn json_response(status: StatusCode, request_id: RequestId, body: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert(X_REQUEST_ID, value);
    }
    response
}

/// The 500 response sent when handling panicked.
pub fn fault_response(request_id: RequestId, description: &str) -> Response {
    let body = reflect::fallback_body(&request_id.to_string(), &[description.to_string()]);
    json_response(StatusCode::INTERNAL_SERVER_ERROR, request_id, body)
}

/// Best-effort text of a panic payload.
pub fn panic_description(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Scale a byte count by powers of 1000 while it exceeds 1000.
pub fn human_size(bytes: usize) -> (f64, &'static str) {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size > 1000.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }
    (size, SIZE_UNITS[unit])
}

/// `human_size` rendered for a log line, e.g. `1.5 kb`.
pub fn format_size(bytes: usize) -> String {
    let (size, unit) = human_size(bytes);
    format!("{} {}", size, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for() {
        assert_eq!(status_for(&[]), StatusCode::OK);
        assert_eq!(status_for(&["x".to_string()]), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), (0.0, "bytes"));
        assert_eq!(human_size(1000), (1000.0, "bytes"));
        assert_eq!(human_size(1500), (1.5, "kb"));
        assert_eq!(human_size(2_000_000), (2.0, "Mb"));
        assert_eq!(human_size(3_000_000_000), (3.0, "Gb"));
        assert_eq!(format_size(1500), "1.5 kb");
    }

    #[test]
    fn test_fault_response_shape() {
        let id = RequestId::new();
        let response = fault_response(id, "index out of bounds");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(response.headers()[X_REQUEST_ID], id.to_string().as_str());
    }

    #[test]
    fn test_panic_description() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_description(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(format!("formatted {}", 7));
        assert_eq!(panic_description(payload.as_ref()), "formatted 7");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_description(payload.as_ref()), "unknown panic");
    }
}
