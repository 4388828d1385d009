//! Directive resolution facade.
//!
//! Ties the deployment definition to the configuration store, the Vault
//! pipeline and KMS. `serviceConfig` directives return the Consul value as
//! is; `secretConfig` directives return the KMS ciphertext of the Vault
//! secret, base64 encoded.

use crate::config::{KmsKeySource, ServiceDefinition};
use crate::consul::ConsulClient;
use crate::directive::{Directive, DirectiveKind};
use crate::error::{Result, ServiceConfigError};
use crate::secret::{EncryptedSecret, SecretPipeline};
use kms_client::KmsClient;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Value produced by one directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResolvedValue {
    /// Plain configuration value
    Config(String),
    /// Encrypted secret
    Secret(EncryptedSecret),
}

impl ResolvedValue {
    /// Text to substitute for the directive.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Config(value) => value,
            Self::Secret(secret) => secret.value(),
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves directives for one deployment definition.
pub struct ServiceConfigResolver {
    definition: ServiceDefinition,
    consul: ConsulClient,
    secrets: SecretPipeline,
    kms: Arc<dyn KmsClient>,
}

impl fmt::Debug for ServiceConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfigResolver")
            .field("stage", &self.definition.stage())
            .field("consul", &self.consul)
            .field("secrets", &self.secrets)
            .finish_non_exhaustive()
    }
}

impl ServiceConfigResolver {
    /// Create a resolver.
    #[must_use]
    pub fn new(
        definition: ServiceDefinition,
        consul: ConsulClient,
        secrets: SecretPipeline,
        kms: Arc<dyn KmsClient>,
    ) -> Self {
        Self {
            definition,
            consul,
            secrets,
            kms,
        }
    }

    /// Resolve a `serviceConfig:` directive string.
    ///
    /// # Errors
    ///
    /// Returns an error if the directive is invalid or the value cannot be found.
    pub async fn get_service_config(&self, param: &str) -> Result<String> {
        let directive = Directive::parse_as(DirectiveKind::ServiceConfig, param)?;
        self.service_config(&directive.path, directive.fallback.as_deref())
            .await
    }

    /// Resolve a `secretConfig:` directive string.
    ///
    /// # Errors
    ///
    /// Returns an error if the directive is invalid, no KMS key is configured,
    /// or the secret cannot be read or encrypted.
    pub async fn get_secret_config(&self, param: &str) -> Result<String> {
        let directive = Directive::parse_as(DirectiveKind::SecretConfig, param)?;
        let secret = self
            .secret_config(&directive.path, directive.fallback.as_deref())
            .await?;
        Ok(secret.into_value())
    }

    /// Resolve a parsed directive.
    ///
    /// # Errors
    ///
    /// See [`Self::get_service_config`] and [`Self::get_secret_config`].
    pub async fn resolve(&self, directive: &Directive) -> Result<ResolvedValue> {
        let fallback = directive.fallback.as_deref();
        match directive.kind {
            DirectiveKind::ServiceConfig => self
                .service_config(&directive.path, fallback)
                .await
                .map(ResolvedValue::Config),
            DirectiveKind::SecretConfig => self
                .secret_config(&directive.path, fallback)
                .await
                .map(ResolvedValue::Secret),
        }
    }

    /// Resolve every directive in order, stopping at the first failure.
    ///
    /// Values are only returned once all directives resolved.
    ///
    /// # Errors
    ///
    /// Returns the error of the first directive that fails.
    pub async fn resolve_all(&self, directives: &[Directive]) -> Result<Vec<ResolvedValue>> {
        let mut values = Vec::with_capacity(directives.len());
        for directive in directives {
            values.push(self.resolve(directive).await?);
        }
        Ok(values)
    }

    /// KMS key id for the deployment stage.
    ///
    /// A configured `kmsKeyConsulPath` is looked up in Consul and takes
    /// precedence over the deprecated per-stage `kmsKeyId` literal.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceConfigError::KeyIdentifierMissing`] when neither is configured,
    /// or the Consul lookup error.
    pub async fn kms_key_id(&self) -> Result<String> {
        let stage = self.definition.stage();
        match self.definition.plugin().kms_key_source(stage) {
            Some(KmsKeySource::ConsulPath(path)) => self.service_config(path, None).await,
            Some(KmsKeySource::Literal(key_id)) => {
                warn!(
                    stage,
                    "kmsKeyId is deprecated, configure kmsKeyConsulPath instead"
                );
                Ok(key_id.to_string())
            }
            None => Err(ServiceConfigError::KeyIdentifierMissing {
                stage: stage.to_string(),
            }),
        }
    }

    #[instrument(skip(self, fallback))]
    async fn service_config(&self, path: &str, fallback: Option<&str>) -> Result<String> {
        let url = format!("{}{path}", self.definition.plugin().consul_url());

        let value = self
            .consul
            .get(&url)
            .await
            .map_err(|source| ServiceConfigError::ConfigStore {
                path: path.to_string(),
                source,
            })?;

        match (value, fallback) {
            (Some(value), _) => Ok(value),
            (None, Some(fallback)) => {
                debug!("Config missing in Consul, using fallback");
                Ok(fallback.to_string())
            }
            (None, None) => Err(ServiceConfigError::MissingConfig {
                path: path.to_string(),
            }),
        }
    }

    async fn secret_config(&self, path: &str, fallback: Option<&str>) -> Result<EncryptedSecret> {
        let key_id = self.kms_key_id().await?;
        let vault_url = self.definition.plugin().vault_url();

        self.secrets
            .retrieve_and_encrypt(path, &vault_url, self.kms.as_ref(), &key_id, fallback)
            .await
    }
}
