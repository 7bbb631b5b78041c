//! Diagnostic HTTP echo service library.
//!
//! Every request is reflected back as a JSON document describing what
//! actually arrived on the wire: headers, query, form fields, body, basic
//! auth, cookies, plus a unique request ID and timing metadata.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod reflect;

pub use config::EchoConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
