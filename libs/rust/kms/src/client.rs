//! Raw key-management primitive.

use crate::error::KmsResult;
use async_trait::async_trait;

/// Response of a KMS `Encrypt` call.
///
/// The blob is optional because the service contract does not guarantee it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptResponse {
    /// Raw ciphertext bytes
    pub ciphertext_blob: Option<Vec<u8>>,
}

impl EncryptResponse {
    /// Response carrying `blob`.
    #[must_use]
    pub fn with_blob(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            ciphertext_blob: Some(blob.into()),
        }
    }
}

/// Key-management service handle.
#[async_trait]
pub trait KmsClient: Send + Sync {
    /// Encrypt `plaintext` under `key_id`, one round trip, no retries.
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> KmsResult<EncryptResponse>;
}
