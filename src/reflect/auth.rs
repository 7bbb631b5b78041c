//! HTTP Basic credentials.

use axum::http::header;
use base64::Engine as _;

use crate::reflect::error::ReflectError;
use crate::reflect::model::Request;
use crate::reflect::pipeline::{Extractor, RawRequest};

#[derive(Debug, Clone, Copy)]
pub struct BasicAuth;

impl Extractor for BasicAuth {
    fn name(&self) -> &'static str {
        "basic_auth"
    }

    fn extract(&self, raw: &RawRequest, snapshot: &mut Request) -> Result<(), ReflectError> {
        let credentials = raw
            .parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| parse_basic(v.as_bytes()));

        match credentials {
            Some((username, password)) => {
                snapshot.username = Some(username).filter(|u| !u.is_empty());
                snapshot.password = Some(password).filter(|p| !p.is_empty());
            }
            None => tracing::debug!(request_id = %raw.request_id, "...no basic auth found"),
        }
        Ok(())
    }
}

/// Decode `Basic <base64(user:pass)>`. The scheme is case-insensitive.
pub fn parse_basic(value: &[u8]) -> Option<(String, String)> {
    const PREFIX: &[u8] = b"Basic ";

    if value.len() < PREFIX.len() || !value[..PREFIX.len()].eq_ignore_ascii_case(PREFIX) {
        return None;
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(&value[PREFIX.len()..])
        .ok()?;
    let decoded = String::from_utf8_lossy(&decoded);
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}
