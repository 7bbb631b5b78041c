//! Body capture: a JSON object when it parses, the raw text when it does not.

use serde_json::{Map, Value};

use crate::reflect::error::ReflectError;
use crate::reflect::model::{Body, Request};
use crate::reflect::pipeline::{BodyRead, Extractor, RawRequest};

#[derive(Debug, Clone, Copy)]
pub struct JsonBody;

impl Extractor for JsonBody {
    fn name(&self) -> &'static str {
        "body"
    }

    fn extract(&self, raw: &RawRequest, snapshot: &mut Request) -> Result<(), ReflectError> {
        let bytes = match &raw.body {
            BodyRead::Empty => {
                tracing::debug!(request_id = %raw.request_id, "...no request body found");
                return Ok(());
            }
            BodyRead::Failed(cause) => return Err(ReflectError::BodyRead(cause.clone())),
            BodyRead::Bytes(bytes) => bytes,
        };

        tracing::trace!(
            request_id = %raw.request_id,
            body = %String::from_utf8_lossy(bytes),
            "raw request body"
        );

        match serde_json::from_slice::<Map<String, Value>>(bytes) {
            Ok(object) => {
                snapshot.body = Some(Body::Json(object));
                Ok(())
            }
            Err(e) => {
                // The raw text is kept alongside the error.
                snapshot.body = Some(Body::Raw(String::from_utf8_lossy(bytes).into_owned()));
                Err(e.into())
            }
        }
    }
}
