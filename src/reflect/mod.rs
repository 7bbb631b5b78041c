//! Request reflection subsystem.
//!
//! # Data Flow
//! ```text
//! RawRequest (head + peer + buffered body)
//!     → pipeline.rs (ordered extraction steps)
//!         scalars → headers → query → body → form → auth → cookies
//!     → model.rs Response (snapshot + errors)
//!     → finalize metadata
//!     → encode to JSON
//! ```
//!
//! # Design Decisions
//! - Every step records its own soft error and never aborts the others
//! - Absent facets stay `None` and serialize as `null`
//! - Encoding never fails outright: a fallback document keeps `id` and `errors`

pub mod auth;
pub mod body;
pub mod cookies;
pub mod error;
pub mod form;
pub mod headers;
pub mod model;
pub mod pipeline;
pub mod query;
pub mod scalars;

pub use error::{FormError, ReflectError};
pub use model::{Body, Cookie, Metadata, Request, Response};
pub use pipeline::{BodyRead, Extractor, Pipeline, RawRequest};

use crate::observability::metrics;

/// Run the pipeline, finalize timing and encode the document.
pub fn assemble(pipeline: &Pipeline, raw: &RawRequest, document: &mut Response) -> Vec<u8> {
    pipeline.run(raw, document);

    tracing::debug!(request_id = %document.id, "processing metadata...");
    document.metadata.complete();

    encode(document)
}

/// Serialize the document, falling back to a minimal body if that fails.
pub fn encode(document: &mut Response) -> Vec<u8> {
    match serde_json::to_vec(document) {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = ReflectError::Serialize(e.to_string());
            tracing::warn!(request_id = %document.id, "...{}", err);
            metrics::record_soft_error(err.kind());
            document.errors.push(err.to_string());
            fallback_body(&document.id, &document.errors)
        }
    }
}

/// A minimal `{"id", "errors"}` document.
pub fn fallback_body(id: &str, errors: &[String]) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "id": id, "errors": errors }))
        .unwrap_or_else(|_| br#"{"id":"","errors":["failed to encode response"]}"#.to_vec())
}
