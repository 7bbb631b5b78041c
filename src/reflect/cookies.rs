//! Request cookies, in the order the client sent them.

use axum::http::header;

use crate::reflect::error::ReflectError;
use crate::reflect::model::{Cookie, Request};
use crate::reflect::pipeline::{Extractor, RawRequest};

#[derive(Debug, Clone, Copy)]
pub struct Cookies;

impl Extractor for Cookies {
    fn name(&self) -> &'static str {
        "cookies"
    }

    fn extract(&self, raw: &RawRequest, snapshot: &mut Request) -> Result<(), ReflectError> {
        for line in raw.parts.headers.get_all(header::COOKIE) {
            for cookie in parse_cookie_line(&String::from_utf8_lossy(line.as_bytes())) {
                tracing::debug!(request_id = %raw.request_id, name = %cookie.name, "...processed cookie");
                snapshot.cookies.push(cookie);
            }
        }

        if snapshot.cookies.is_empty() {
            tracing::debug!(request_id = %raw.request_id, "...no cookies found");
        }
        Ok(())
    }
}

/// Parse one `Cookie` header line. Pairs with invalid names or values are dropped.
pub fn parse_cookie_line(line: &str) -> Vec<Cookie> {
    line.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let (name, value) = part.split_once('=').unwrap_or((part, ""));
            let name = name.trim();
            if !is_token(name) {
                return None;
            }
            cookie_value(value).map(|value| Cookie::from_pair(name, value))
        })
        .collect()
}

fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

fn cookie_value(raw: &str) -> Option<&str> {
    let value = if raw.len() > 1 && raw.starts_with('"') && raw.ends_with('"') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    };

    value
        .bytes()
        .all(|b| (0x20..0x7f).contains(&b) && b != b'"' && b != b';' && b != b'\\')
        .then_some(value)
}
