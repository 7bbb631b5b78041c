//! The JSON document returned for every reflected request.
//!
//! Optional fields are `Option`s or `Option`al maps so that a field is either
//! wholly absent (serialized as `null`) or fully populated. Maps are ordered so
//! the output is stable across runs.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Root document sent back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub id: String,
    pub request: Request,
    pub errors: Vec<String>,
    pub metadata: Metadata,
}

impl Response {
    /// Start a document for a freshly received request.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            request: Request::default(),
            errors: Vec::new(),
            metadata: Metadata::received(),
        }
    }
}

/// Snapshot of everything observable about one inbound request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Request {
    pub body: Option<Body>,
    pub cookies: Vec<Cookie>,
    pub header: Option<BTreeMap<String, Vec<String>>>,
    pub hostname: Option<String>,
    pub form: Option<BTreeMap<String, Value>>,
    pub method: Option<String>,
    pub password: Option<String>,
    pub path: Option<String>,
    pub protocol: Option<String>,
    pub query: Option<BTreeMap<String, Value>>,
    pub referer: Option<String>,
    pub remote_addr: Option<String>,
    pub size: i64,
    pub user_agent: Option<String>,
    pub username: Option<String>,
}

/// A request body: decoded JSON when possible, the raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    Json(Map<String, Value>),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cookie {
    #[serde(rename = "cookie")]
    pub name: String,
    pub value: String,
    pub domain: String,
    pub expires: String,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    /// A cookie as sent in a `Cookie` request header, which carries no attributes.
    pub fn from_pair(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            expires: format_expires(None),
            secure: false,
            http_only: false,
        }
    }
}

/// Render a cookie expiry as a human-readable absolute timestamp.
///
/// Cookies without an expiry render as the empty string.
pub fn format_expires(expires: Option<DateTime<Utc>>) -> String {
    expires
        .map(|at| at.format("%Y-%m-%d %H:%M:%S %z UTC").to_string())
        .unwrap_or_default()
}

/// Timing information for one request.
///
/// `duration_ms` holds whole milliseconds measured on the monotonic clock.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub duration_ms: u64,
    pub received_timestamp: DateTime<Utc>,
    pub responded_timestamp: DateTime<Utc>,
    #[serde(skip)]
    started: Instant,
}

impl Metadata {
    /// Record the instant a request was received.
    pub fn received() -> Self {
        let now = Utc::now();
        Self {
            duration_ms: 0,
            received_timestamp: now,
            responded_timestamp: now,
            started: Instant::now(),
        }
    }

    /// Stamp the response time and compute the elapsed duration.
    pub fn complete(&mut self) {
        // Wall clocks can step backwards; never report a response before its request.
        self.responded_timestamp = Utc::now().max(self.received_timestamp);
        self.duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_empty_document_shape() {
        let response = Response::new("abc");
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["id"], "abc");
        assert_eq!(value["errors"], json!([]));
        assert_eq!(value["request"]["cookies"], json!([]));
        assert_eq!(value["request"]["body"], Value::Null);
        assert_eq!(value["request"]["header"], Value::Null);
        assert_eq!(value["request"]["size"], 0);
        assert!(value["metadata"]["duration_ms"].is_u64());
        assert!(value["metadata"].get("started").is_none());
    }

    #[test]
    fn test_cookie_name_serializes_as_cookie() {
        let value = serde_json::to_value(Cookie::from_pair("session", "xyz")).unwrap();
        assert_eq!(
            value,
            json!({
                "cookie": "session",
                "value": "xyz",
                "domain": "",
                "expires": "",
                "secure": false,
                "http_only": false,
            })
        );
    }

    #[test]
    fn test_format_expires() {
        let at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_expires(Some(at)), "2030-01-02 03:04:05 +0000 UTC");
        assert_eq!(format_expires(None), "");
    }

    #[test]
    fn test_body_serializes_untagged() {
        let mut map = Map::new();
        map.insert("x".into(), json!(1));
        assert_eq!(serde_json::to_value(Body::Json(map)).unwrap(), json!({"x": 1}));
        assert_eq!(serde_json::to_value(Body::Raw("{bad".into())).unwrap(), json!("{bad"));
    }

    #[test]
    fn test_complete_orders_timestamps() {
        let mut metadata = Metadata::received();
        metadata.complete();
        assert!(metadata.responded_timestamp >= metadata.received_timestamp);
    }
}
