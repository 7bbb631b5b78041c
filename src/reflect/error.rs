//! Soft errors recorded while building a snapshot.

use thiserror::Error;

/// A recoverable problem in one extraction step.
///
/// The `Display` output is exactly the string placed in the response's
/// `errors` list.
#[derive(Debug, Error)]
pub enum ReflectError {
    /// The body stream failed or exceeded the configured limit.
    #[error("failed to read request body into memory: '{0}'")]
    BodyRead(String),

    /// The body was read but is not a JSON object.
    #[error("failed to parse request body into json: '{0}'")]
    BodyJson(#[from] serde_json::Error),

    /// The query string or form body is not valid `application/x-www-form-urlencoded`.
    #[error("error parsing form data: '{0}'")]
    Form(#[from] FormError),

    /// The finished document could not be encoded.
    #[error("failed to parse response object into json: '{0}'")]
    Serialize(String),
}

impl ReflectError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ReflectError::BodyRead(_) => "body_read",
            ReflectError::BodyJson(_) => "body_json",
            ReflectError::Form(_) => "form",
            ReflectError::Serialize(_) => "serialize",
        }
    }
}

/// Why an urlencoded payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("invalid URL escape \"{0}\"")]
    InvalidEscape(String),

    #[error("invalid semicolon separator in query")]
    Semicolon,
}
