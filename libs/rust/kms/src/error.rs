//! Error types for KMS operations.

use thiserror::Error;

/// Errors from KMS operations.
#[derive(Error, Debug)]
pub enum KmsError {
    /// The response carried no usable ciphertext
    #[error("Missing encrypted secret value from the key-management response")]
    MissingCiphertext,

    /// The KMS request itself failed
    #[error("KMS request failed: {0}")]
    Service(String),
}

/// Result type for KMS operations.
pub type KmsResult<T> = Result<T, KmsError>;

impl KmsError {
    /// Create a service error.
    #[must_use]
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }
}
