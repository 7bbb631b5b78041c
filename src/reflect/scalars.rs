//! Scalar request facets: host, method, path, protocol, referer, peer, agent, size.

use axum::http::{header, HeaderMap};

use crate::reflect::error::ReflectError;
use crate::reflect::model::Request;
use crate::reflect::pipeline::{Extractor, RawRequest};

#[derive(Debug, Clone, Copy)]
pub struct Scalars;

impl Extractor for Scalars {
    fn name(&self) -> &'static str {
        "scalars"
    }

    fn extract(&self, raw: &RawRequest, snapshot: &mut Request) -> Result<(), ReflectError> {
        let parts = &raw.parts;

        // Absolute-form and HTTP/2 requests carry the host in the URI; origin-form in the header.
        let host = parts
            .uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| header_str(&parts.headers, header::HOST));

        snapshot.hostname = non_empty(host);
        snapshot.method = non_empty(Some(parts.method.as_str().to_string()));
        snapshot.path = non_empty(Some(parts.uri.path().to_string()));
        snapshot.protocol = non_empty(Some(format!("{:?}", parts.version)));
        snapshot.referer = non_empty(header_str(&parts.headers, header::REFERER));
        snapshot.remote_addr = non_empty(raw.remote_addr.map(|addr| addr.to_string()));
        snapshot.user_agent = non_empty(header_str(&parts.headers, header::USER_AGENT));
        snapshot.size = declared_size(&parts.headers);

        Ok(())
    }
}

/// Declared body length: `Content-Length` when given, `-1` for chunked bodies, else `0`.
pub fn declared_size(headers: &HeaderMap) -> i64 {
    if let Some(length) = header_str(headers, header::CONTENT_LENGTH) {
        return length.trim().parse().unwrap_or(0);
    }

    let chunked = headers
        .get_all(header::TRANSFER_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.to_ascii_lowercase().contains("chunked"));

    if chunked {
        -1
    } else {
        0
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::pipeline::test_support::raw;
    use axum::http;

    #[test]
    fn test_copies_present_facets() {
        let mut raw = raw(
            http::Request::builder()
                .method("POST")
                .uri("/api/items?x=1")
                .header("Host", "echo.local")
                .header("Referer", "https://origin.example/")
                .header("User-Agent", "curl/8.0")
                .header("Content-Length", "12")
                .body("")
                .unwrap(),
        );
        raw.remote_addr = Some("10.0.0.7:51234".parse().unwrap());
        let mut snapshot = Request::default();

        Scalars.extract(&raw, &mut snapshot).unwrap();

        assert_eq!(snapshot.hostname.as_deref(), Some("echo.local"));
        assert_eq!(snapshot.method.as_deref(), Some("POST"));
        assert_eq!(snapshot.path.as_deref(), Some("/api/items"));
        assert_eq!(snapshot.protocol.as_deref(), Some("HTTP/1.1"));
        assert_eq!(snapshot.referer.as_deref(), Some("https://origin.example/"));
        assert_eq!(snapshot.remote_addr.as_deref(), Some("10.0.0.7:51234"));
        assert_eq!(snapshot.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(snapshot.size, 12);
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let raw = raw(
            http::Request::builder()
                .uri("/")
                .header("Referer", "")
                .header("User-Agent", "")
                .body("")
                .unwrap(),
        );
        let mut snapshot = Request::default();

        Scalars.extract(&raw, &mut snapshot).unwrap();

        assert!(snapshot.hostname.is_none());
        assert!(snapshot.referer.is_none());
        assert!(snapshot.user_agent.is_none());
        assert!(snapshot.remote_addr.is_none());
        assert_eq!(snapshot.size, 0);
    }

    #[test]
    fn test_absolute_uri_supplies_host() {
        let raw = raw(
            http::Request::builder()
                .uri("http://upstream.internal:8080/status")
                .body("")
                .unwrap(),
        );
        let mut snapshot = Request::default();

        Scalars.extract(&raw, &mut snapshot).unwrap();

        assert_eq!(snapshot.hostname.as_deref(), Some("upstream.internal:8080"));
        assert_eq!(snapshot.path.as_deref(), Some("/status"));
    }

    #[test]
    fn test_chunked_size_is_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
        assert_eq!(declared_size(&headers), -1);
        assert_eq!(declared_size(&HeaderMap::new()), 0);
    }
}
