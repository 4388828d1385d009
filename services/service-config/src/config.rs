//! Deployment definition and runtime settings.
//!
//! The deployment definition is the serverless-style YAML file the directives
//! come from; only the parts this tool needs are read. Runtime settings come
//! from the environment, like the platform services.

use crate::error::{Result, ServiceConfigError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Consul address used when the plugin config has none.
pub const DEFAULT_CONSUL_ADDR: &str = "http://localhost:8500";
/// Vault address used when the plugin config has none.
pub const DEFAULT_VAULT_ADDR: &str = "http://localhost:8200";
/// Stage used when the provider section has none.
pub const DEFAULT_STAGE: &str = "dev";

/// Deployment definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDefinition {
    /// Provider section
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Custom section
    #[serde(default)]
    pub custom: CustomConfig,
}

/// `provider` section of the deployment definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Deployment stage
    #[serde(default = "default_stage")]
    pub stage: String,
    /// AWS region used for KMS
    #[serde(default)]
    pub region: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            stage: default_stage(),
            region: None,
        }
    }
}

fn default_stage() -> String {
    DEFAULT_STAGE.to_string()
}

/// `custom` section of the deployment definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomConfig {
    /// Settings of this plugin
    #[serde(default)]
    pub service_config_plugin: PluginConfig,
}

/// `custom.service_config_plugin` settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    /// Consul base address, e.g. `http://consul:8500`
    #[serde(default)]
    pub consul_addr: Option<String>,
    /// Key prefix under `/v1/kv/`
    #[serde(default)]
    pub consul_prefix: Option<String>,
    /// Vault base address, e.g. `https://vault:8200`
    #[serde(default)]
    pub vault_addr: Option<String>,
    /// Consul path holding the KMS key id
    #[serde(default)]
    pub kms_key_consul_path: Option<String>,
    /// Deprecated literal KMS key id per stage
    #[serde(default)]
    pub kms_key_id: BTreeMap<String, String>,
}

/// Where the KMS key id for a stage comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmsKeySource<'a> {
    /// Look the key id up in Consul at this path
    ConsulPath(&'a str),
    /// Literal key id (deprecated)
    Literal(&'a str),
}

impl PluginConfig {
    /// Set the Consul address.
    #[must_use]
    pub fn with_consul_addr(mut self, addr: impl Into<String>) -> Self {
        self.consul_addr = Some(addr.into());
        self
    }

    /// Set the Vault address.
    #[must_use]
    pub fn with_vault_addr(mut self, addr: impl Into<String>) -> Self {
        self.vault_addr = Some(addr.into());
        self
    }

    /// Consul KV base URL, ending with `/`.
    #[must_use]
    pub fn consul_url(&self) -> String {
        let addr = base_addr(self.consul_addr.as_deref(), DEFAULT_CONSUL_ADDR);
        match self.consul_prefix.as_deref().map(|p| p.trim_matches('/')) {
            Some(prefix) if !prefix.is_empty() => format!("{addr}/v1/kv/{prefix}/"),
            _ => format!("{addr}/v1/kv/"),
        }
    }

    /// Vault API base URL, ending with `/`.
    #[must_use]
    pub fn vault_url(&self) -> String {
        let addr = base_addr(self.vault_addr.as_deref(), DEFAULT_VAULT_ADDR);
        format!("{addr}/v1/")
    }

    /// KMS key source for `stage`; the Consul path wins over the literal.
    #[must_use]
    pub fn kms_key_source(&self, stage: &str) -> Option<KmsKeySource<'_>> {
        if let Some(path) = self.kms_key_consul_path.as_deref().filter(|p| !p.is_empty()) {
            return Some(KmsKeySource::ConsulPath(path));
        }
        self.kms_key_id
            .get(stage)
            .map(String::as_str)
            .filter(|k| !k.is_empty())
            .map(KmsKeySource::Literal)
    }
}

fn base_addr<'a>(configured: Option<&'a str>, default: &'a str) -> &'a str {
    configured
        .filter(|a| !a.is_empty())
        .unwrap_or(default)
        .trim_end_matches('/')
}

impl ServiceDefinition {
    /// Parse a deployment definition from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceConfigError::Config`] on malformed YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let definition: Option<Self> = serde_yaml::from_str(yaml)
            .map_err(|e| ServiceConfigError::config(format!("Invalid deployment definition: {e}")))?;
        Ok(definition.unwrap_or_default())
    }

    /// Load a deployment definition file.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceConfigError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            ServiceConfigError::config(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Deployment stage.
    #[must_use]
    pub fn stage(&self) -> &str {
        &self.provider.stage
    }

    /// Plugin settings.
    #[must_use]
    pub const fn plugin(&self) -> &PluginConfig {
        &self.custom.service_config_plugin
    }

    /// Override the stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.provider.stage = stage.into();
        self
    }

    /// Override the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.provider.region = Some(region.into());
        self
    }

    /// Replace the plugin settings.
    #[must_use]
    pub fn with_plugin(mut self, plugin: PluginConfig) -> Self {
        self.custom.service_config_plugin = plugin;
        self
    }
}

/// Runtime settings loaded from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// HTTP request timeout for Consul and Vault
    pub http_timeout: Duration,
    /// HTTP connect timeout for Consul and Vault
    pub http_connect_timeout: Duration,
    /// KMS operation timeout
    pub kms_timeout: Duration,
    /// KMS endpoint override
    pub kms_endpoint: Option<String>,
    /// Log level filter
    pub log_level: String,
    /// Emit JSON logs
    pub json_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(10),
            http_connect_timeout: Duration::from_secs(5),
            kms_timeout: Duration::from_secs(10),
            kms_endpoint: None,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Settings {
    /// Load settings from the environment, reading `.env` first.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but invalid.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            http_timeout: parse_secs(&lookup, "SERVICE_CONFIG_HTTP_TIMEOUT_SECS", defaults.http_timeout)?,
            http_connect_timeout: parse_secs(
                &lookup,
                "SERVICE_CONFIG_HTTP_CONNECT_TIMEOUT_SECS",
                defaults.http_connect_timeout,
            )?,
            kms_timeout: parse_secs(&lookup, "SERVICE_CONFIG_KMS_TIMEOUT_SECS", defaults.kms_timeout)?,
            kms_endpoint: lookup("SERVICE_CONFIG_KMS_ENDPOINT").filter(|e| !e.is_empty()),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }
}

/// Parse a whole number of seconds, keeping `default` when unset.
fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> Result<Duration> {
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ServiceConfigError::config(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}
