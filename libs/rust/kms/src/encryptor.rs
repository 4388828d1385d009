//! Checked encryption call.

use crate::client::KmsClient;
use crate::error::{KmsError, KmsResult};
use tracing::instrument;

/// Non-empty ciphertext returned by KMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiphertextBlob(Vec<u8>);

impl CiphertextBlob {
    /// Raw ciphertext bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encrypt `plaintext` under `key_id`.
///
/// # Errors
///
/// Returns [`KmsError::MissingCiphertext`] when the response has no blob or
/// an empty one, and propagates request failures as [`KmsError::Service`].
#[instrument(skip(kms, plaintext))]
pub async fn encrypt(kms: &dyn KmsClient, plaintext: &[u8], key_id: &str) -> KmsResult<CiphertextBlob> {
    let response = kms.encrypt(key_id, plaintext).await?;

    match response.ciphertext_blob {
        Some(blob) if !blob.is_empty() => Ok(CiphertextBlob(blob)),
        _ => Err(KmsError::MissingCiphertext),
    }
}
