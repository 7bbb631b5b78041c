//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, fault guard)
//!     → request.rs (request ID, peer address, buffered body)
//!     → reflect pipeline (snapshot + soft errors)
//!     → response.rs (status, content type, request ID header)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, X_REQUEST_ID};
pub use response::JSON_CONTENT_TYPE;
pub use server::{build_router, HttpServer};
