//! URL query string scan.
//!
//! Splits the raw query on `&` and each entry on its first `=`. Entries
//! without `=`, with a `;`, or with a malformed escape are skipped and the
//! scan continues with the next entry. Repeated keys keep the last value here;
//! the form step later reports them as arrays.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::reflect::error::ReflectError;
use crate::reflect::form::parse_pair;
use crate::reflect::model::Request;
use crate::reflect::pipeline::{Extractor, RawRequest};

#[derive(Debug, Clone, Copy)]
pub struct Query;

impl Extractor for Query {
    fn name(&self) -> &'static str {
        "query"
    }

    fn extract(&self, raw: &RawRequest, snapshot: &mut Request) -> Result<(), ReflectError> {
        let query = match raw.parts.uri.query() {
            Some(q) if !q.is_empty() => q,
            _ => {
                tracing::debug!(request_id = %raw.request_id, "...no url query parameters found");
                return Ok(());
            }
        };

        for entry in query.split('&') {
            if !entry.contains('=') {
                if !entry.is_empty() {
                    tracing::debug!(request_id = %raw.request_id, entry, "...skipped query component");
                }
                continue;
            }

            match parse_pair(entry.as_bytes()) {
                Ok((key, value)) => {
                    snapshot
                        .query
                        .get_or_insert_with(BTreeMap::new)
                        .insert(key, Value::String(value));
                    tracing::debug!(request_id = %raw.request_id, entry, "...processed query component");
                }
                Err(e) => {
                    tracing::debug!(request_id = %raw.request_id, entry, error = %e, "...skipped query component");
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::pipeline::test_support::raw;
    use axum::http;
    use serde_json::json;

    fn run(uri: &str) -> Request {
        let raw = raw(http::Request::builder().uri(uri).body("").unwrap());
        let mut snapshot = Request::default();
        Query.extract(&raw, &mut snapshot).unwrap();
        snapshot
    }

    #[test]
    fn test_simple_query() {
        let query = run("/?a=1&b=2").query.unwrap();
        assert_eq!(query.len(), 2);
        assert_eq!(query["a"], json!("1"));
        assert_eq!(query["b"], json!("2"));
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let query = run("/?token=abc==&q=a%20b").query.unwrap();
        assert_eq!(query["token"], json!("abc=="));
        assert_eq!(query["q"], json!("a b"));
    }

    #[test]
    fn test_malformed_entries_are_skipped_and_scan_continues() {
        let query = run("/?first=1&bare&bad=%zz&semi=1;x=2&last=9").query.unwrap();
        assert_eq!(query.len(), 2);
        assert_eq!(query["first"], json!("1"));
        assert_eq!(query["last"], json!("9"));
    }

    #[test]
    fn test_no_query_leaves_field_absent() {
        assert!(run("/plain").query.is_none());
        assert!(run("/plain?").query.is_none());
    }
}
