//! Centralized HTTP client configuration and building.
//!
//! Both the configuration store and the secret store are read over plain
//! HTTP(S) with the same client settings, so they share this module.

use crate::PlatformError;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;

/// HTTP client configuration.
///
/// Timeouts are explicit: a resolution run must never hang on a slow store.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout (default: 10s)
    pub timeout: Duration,
    /// Connection timeout (default: 5s)
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            user_agent: concat!("service-config/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g., TLS initialization fails).
///
/// # Examples
///
/// ```
/// use rust_common::{HttpConfig, build_http_client};
/// use std::time::Duration;
///
/// let config = HttpConfig::default().with_timeout(Duration::from_secs(3));
/// let client = build_http_client(&config);
/// assert!(client.is_ok());
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()
}

/// Classify a response status for `resource`.
///
/// Success statuses pass through; everything else becomes a [`PlatformError`].
///
/// # Errors
///
/// Returns the matching [`PlatformError`] for any non-success status.
pub fn error_for_status(status: StatusCode, resource: &str) -> Result<(), PlatformError> {
    match status.as_u16() {
        _ if status.is_success() => Ok(()),
        404 => Err(PlatformError::not_found(resource)),
        401 | 403 => Err(PlatformError::AuthFailed(format!("Status {status} for {resource}"))),
        429 => Err(PlatformError::RateLimited),
        _ => Err(PlatformError::unavailable(format!("Status {status} for {resource}"))),
    }
}
