//! Vault error types using thiserror 2.0.
//!
//! The read path has a single outward failure: the caller cannot act
//! differently on "not found" and "could not be fetched", so both are
//! [`VaultError::MissingSecret`]. The underlying cause is only traced.

use thiserror::Error;

/// Vault-specific errors.
#[derive(Error, Debug)]
pub enum VaultError {
    /// No usable secret value at the given path
    #[error("Missing secret in Vault at {path}")]
    MissingSecret {
        /// Secret path as requested by the caller
        path: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for Vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

impl VaultError {
    /// Create a missing secret error.
    #[must_use]
    pub fn missing_secret(path: impl Into<String>) -> Self {
        Self::MissingSecret { path: path.into() }
    }
}

impl From<reqwest::Error> for VaultError {
    fn from(err: reqwest::Error) -> Self {
        Self::InvalidConfig(format!("HTTP client: {err}"))
    }
}
