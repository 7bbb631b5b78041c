//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → CLI flags / environment overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → EchoConfig (validated, immutable)
//!     → handed to HttpServer and observability at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::EchoConfig;
pub use schema::{LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
