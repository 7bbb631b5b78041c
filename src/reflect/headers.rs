//! Header copy with canonical (`X-Forwarded-For` style) names.
//!
//! `Host` is not copied; it is reported as `hostname`.

use std::collections::BTreeMap;

use axum::http::header;

use crate::reflect::error::ReflectError;
use crate::reflect::model::Request;
use crate::reflect::pipeline::{Extractor, RawRequest};

#[derive(Debug, Clone, Copy)]
pub struct Headers;

impl Extractor for Headers {
    fn name(&self) -> &'static str {
        "headers"
    }

    fn extract(&self, raw: &RawRequest, snapshot: &mut Request) -> Result<(), ReflectError> {
        for (name, value) in raw.parts.headers.iter() {
            if name == header::HOST {
                continue;
            }
            snapshot
                .header
                .get_or_insert_with(BTreeMap::new)
                .entry(canonical_name(name.as_str()))
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        Ok(())
    }
}

/// Upper-case the first letter and every letter following a hyphen; lower-case the rest.
pub fn canonical_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}
