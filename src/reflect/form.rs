//! Form fields, split into query-sourced and body-sourced sets.
//!
//! The unified form is the URL query plus, for urlencoded `POST`/`PUT`/`PATCH`
//! submissions, the body. A field that appears in the body set is reported
//! under `form` only; every other field is merged into `query`.
//!
//! A field with one value is reported as a string, a repeated field as an
//! array of strings in the order sent.

use std::collections::BTreeMap;

use axum::http::{header, Method};
use serde_json::Value;
use url::form_urlencoded;

use crate::reflect::error::{FormError, ReflectError};
use crate::reflect::model::Request;
use crate::reflect::pipeline::{BodyRead, Extractor, RawRequest};

const URLENCODED: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy)]
pub struct Form;

impl Extractor for Form {
    fn name(&self) -> &'static str {
        "form"
    }

    fn extract(&self, raw: &RawRequest, snapshot: &mut Request) -> Result<(), ReflectError> {
        // Parse both sources before touching the snapshot so a failure populates nothing.
        let query_fields = match raw.parts.uri.query() {
            Some(query) => parse_urlencoded(query.as_bytes())?,
            None => Vec::new(),
        };
        let body_fields = match &raw.body {
            BodyRead::Bytes(bytes) if carries_form_body(raw) => parse_urlencoded(bytes)?,
            _ => Vec::new(),
        };

        let body_form = group(body_fields);
        let mut query_count = 0;
        for (name, values) in group(query_fields) {
            if body_form.contains_key(&name) {
                continue;
            }
            snapshot
                .query
                .get_or_insert_with(BTreeMap::new)
                .insert(name, field_value(values));
            query_count += 1;
        }

        let form_count = body_form.len();
        for (name, values) in body_form {
            snapshot
                .form
                .get_or_insert_with(BTreeMap::new)
                .insert(name, field_value(values));
        }

        tracing::debug!(
            request_id = %raw.request_id,
            query_fields = query_count,
            form_fields = form_count,
            "...processed form data"
        );
        Ok(())
    }
}

/// Parse an `application/x-www-form-urlencoded` payload.
///
/// Empty segments are ignored. Any segment with a `;` or a malformed percent
/// escape rejects the whole payload.
pub fn parse_urlencoded(input: &[u8]) -> Result<Vec<(String, String)>, FormError> {
    input
        .split(|b| *b == b'&')
        .filter(|segment| !segment.is_empty())
        .map(parse_pair)
        .collect()
}

/// Decode one `key=value` segment. A segment without `=` is a key with an empty value.
pub fn parse_pair(segment: &[u8]) -> Result<(String, String), FormError> {
    if segment.contains(&b';') {
        return Err(FormError::Semicolon);
    }
    validate_escapes(segment)?;

    Ok(form_urlencoded::parse(segment)
        .next()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .unwrap_or_default())
}

fn validate_escapes(segment: &[u8]) -> Result<(), FormError> {
    let mut i = 0;
    while i < segment.len() {
        if segment[i] == b'%' {
            let escape = &segment[i..segment.len().min(i + 3)];
            if escape.len() < 3 || !escape[1..].iter().all(u8::is_ascii_hexdigit) {
                return Err(FormError::InvalidEscape(
                    String::from_utf8_lossy(escape).into_owned(),
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn carries_form_body(raw: &RawRequest) -> bool {
    let method = &raw.parts.method;
    if method != Method::POST && method != Method::PUT && method != Method::PATCH {
        return false;
    }

    raw.parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|media_type| media_type.trim().eq_ignore_ascii_case(URLENCODED))
        .unwrap_or(false)
}

fn group(pairs: Vec<(String, String)>) -> BTreeMap<String, Vec<String>> {
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in pairs {
        fields.entry(name).or_default().push(value);
    }
    fields
}

fn field_value(mut values: Vec<String>) -> Value {
    if values.len() == 1 {
        Value::String(values.remove(0))
    } else {
        Value::Array(values.into_iter().map(Value::String).collect())
    }
}
