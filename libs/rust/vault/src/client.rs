//! Vault HTTP client.

use crate::{
    config::VaultConfig,
    error::{VaultError, VaultResult},
    provider::SecretStore,
    secrets::{VaultToken, parse_secret_body},
};
use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use rust_common::{PlatformError, build_http_client, error_for_status};
use secrecy::SecretString;
use tracing::{debug, instrument, warn};

const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Vault client reading single-value secrets.
#[derive(Debug, Clone)]
pub struct VaultClient {
    http: Client,
}

impl VaultClient {
    /// Create a new Vault client.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] if the HTTP client cannot be built.
    pub fn new(config: &VaultConfig) -> VaultResult<Self> {
        let http = build_http_client(&config.http_config())?;
        Ok(Self { http })
    }

    async fn read(&self, url: &str, token: &VaultToken) -> Result<Option<SecretString>, PlatformError> {
        let response = self
            .http
            .get(url)
            .header(VAULT_TOKEN_HEADER, token.expose())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        error_for_status(response.status(), url)?;

        let body = response.bytes().await?;
        parse_secret_body(&body)
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    #[instrument(skip_all, fields(path = %path))]
    async fn fetch(
        &self,
        path: &str,
        base_url: &str,
        token: &VaultToken,
    ) -> VaultResult<SecretString> {
        let url = format!("{base_url}{path}");

        match self.read(&url, token).await {
            Ok(Some(secret)) => {
                debug!("Secret retrieved from Vault");
                Ok(secret)
            }
            Ok(None) => {
                debug!("Vault response carried no data.value");
                Err(VaultError::missing_secret(path))
            }
            Err(e) if e.is_not_found() => {
                debug!("Secret not found in Vault");
                Err(VaultError::missing_secret(path))
            }
            Err(e) => {
                warn!(error = %e, "Vault read failed");
                Err(VaultError::missing_secret(path))
            }
        }
    }
}
