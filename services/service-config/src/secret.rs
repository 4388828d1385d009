//! Retrieve-and-encrypt pipeline for `secretConfig` values.
//!
//! Reads a plaintext secret from Vault, falls back to a caller supplied
//! literal when the secret is missing, and returns the KMS ciphertext as
//! base64 text. The plaintext lives in a [`SecretString`] for the duration
//! of one call and is never logged.

use crate::error::{Result, ServiceConfigError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kms_client::{CiphertextBlob, KmsClient};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use vault_client::{SecretStore, VaultError, VaultToken};

/// Encrypted secret ready to embed in a deployment artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncryptedSecret {
    value: String,
}

impl EncryptedSecret {
    fn from_ciphertext(ciphertext: &CiphertextBlob) -> Self {
        Self {
            value: STANDARD.encode(ciphertext.as_bytes()),
        }
    }

    /// Base64 text of the ciphertext.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consume into the base64 text.
    #[must_use]
    pub fn into_value(self) -> String {
        self.value
    }
}

impl fmt::Display for EncryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Vault-to-KMS secret pipeline.
///
/// The Vault token is handed in once at construction; a pipeline without a
/// token fails every call with [`ServiceConfigError::MissingAuthToken`]
/// before touching the network.
pub struct SecretPipeline {
    store: Arc<dyn SecretStore>,
    token: Option<VaultToken>,
}

impl fmt::Debug for SecretPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPipeline")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl SecretPipeline {
    /// Create a pipeline reading from `store` with `token`.
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>, token: Option<VaultToken>) -> Self {
        Self { store, token }
    }

    /// Fetch the secret at `secret_path` and encrypt it under `key_id`.
    ///
    /// When Vault has no usable value, `fallback` is encrypted instead; an
    /// empty fallback still counts as supplied.
    ///
    /// # Errors
    ///
    /// - [`ServiceConfigError::MissingAuthToken`] without a Vault token
    /// - [`ServiceConfigError::MissingSecret`] when Vault has no value and there is no fallback
    /// - [`ServiceConfigError::EncryptionFailure`] when KMS returns no usable ciphertext
    #[instrument(skip(self, kms, fallback), fields(path = %secret_path))]
    pub async fn retrieve_and_encrypt(
        &self,
        secret_path: &str,
        vault_base_url: &str,
        kms: &dyn KmsClient,
        key_id: &str,
        fallback: Option<&str>,
    ) -> Result<EncryptedSecret> {
        let token = self.token.as_ref().ok_or(ServiceConfigError::MissingAuthToken)?;

        let plaintext = match self.store.fetch(secret_path, vault_base_url, token).await {
            Ok(secret) => secret,
            Err(e) => match fallback {
                Some(fallback) => {
                    debug!("Secret missing in Vault, using fallback");
                    SecretString::from(fallback.to_owned())
                }
                None => return Err(missing_secret(e, secret_path)),
            },
        };

        let ciphertext = kms_client::encrypt(kms, plaintext.expose_secret().as_bytes(), key_id)
            .await
            .map_err(|e| {
                warn!(error = %e, "KMS encryption failed");
                ServiceConfigError::EncryptionFailure
            })?;

        Ok(EncryptedSecret::from_ciphertext(&ciphertext))
    }
}

fn missing_secret(err: VaultError, secret_path: &str) -> ServiceConfigError {
    match err {
        VaultError::MissingSecret { path } => ServiceConfigError::MissingSecret { path },
        VaultError::InvalidConfig(reason) => {
            warn!(%reason, "Vault client misconfigured");
            ServiceConfigError::MissingSecret {
                path: secret_path.to_string(),
            }
        }
    }
}
