//! Secret store abstraction.

use crate::{error::VaultResult, secrets::VaultToken};
use async_trait::async_trait;
use secrecy::SecretString;

/// Read access to a secret store.
///
/// Implementations report "not found" and "could not be read" alike, as
/// [`crate::VaultError::MissingSecret`] carrying `path`.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the secret stored at `base_url` + `path`.
    async fn fetch(
        &self,
        path: &str,
        base_url: &str,
        token: &VaultToken,
    ) -> VaultResult<SecretString>;
}
