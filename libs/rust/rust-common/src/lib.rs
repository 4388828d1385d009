//! Shared library for cross-cutting concerns in the service-config workspace.
//!
//! This crate provides centralized implementations for:
//! - Transport error types used by the configuration and secret store clients
//! - HTTP client configuration, building and status classification
//! - Tracing subscriber initialisation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod tracing_config;

pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client, error_for_status};
pub use tracing_config::{TracingConfig, init_tracing};
