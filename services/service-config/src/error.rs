//! Caller-facing error taxonomy.
//!
//! Every variant is terminal for the resolution that raised it. Messages
//! never carry secret plaintext or credentials.

use rust_common::PlatformError;
use thiserror::Error;

/// Errors raised while resolving a directive.
#[derive(Error, Debug)]
pub enum ServiceConfigError {
    /// No Vault credential available; raised before any network access
    #[error("Missing vault token for authentication, you need to set VAULT_TOKEN as an environment variable")]
    MissingAuthToken,

    /// Vault had no usable value and no fallback was supplied
    #[error("Missing secret in Vault at {path}")]
    MissingSecret {
        /// Secret path as requested
        path: String,
    },

    /// KMS did not return a usable ciphertext
    #[error("Missing encrypted secret value from the key-management response")]
    EncryptionFailure,

    /// No KMS key configured for the deployment stage
    #[error(
        "KMS Key Id missing, please specify it in the plugin config with either:\n\
         service_config_plugin.kmsKeyConsulPath = path/to/key\n\
         [DEPRECATED] service_config_plugin.kmsKeyId.{stage} = keyId"
    )]
    KeyIdentifierMissing {
        /// Deployment stage being resolved
        stage: String,
    },

    /// Configuration store had no value and no fallback was supplied
    #[error("Missing config in Consul at {path}")]
    MissingConfig {
        /// Key path as requested
        path: String,
    },

    /// Configuration store could not be read
    #[error("Consul lookup failed for {path}: {source}")]
    ConfigStore {
        /// Key path as requested
        path: String,
        /// Transport failure
        #[source]
        source: PlatformError,
    },

    /// Directive string could not be parsed
    #[error("Invalid directive: {0}")]
    InvalidDirective(String),

    /// Deployment definition or runtime settings are invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vault client could not be constructed
    #[error(transparent)]
    Vault(#[from] vault_client::VaultError),
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ServiceConfigError>;

impl ServiceConfigError {
    /// Create an invalid directive error.
    #[must_use]
    pub fn invalid_directive(msg: impl Into<String>) -> Self {
        Self::InvalidDirective(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingAuthToken => MISSING_AUTH_TOKEN,
            Self::MissingSecret { .. } => MISSING_SECRET,
            Self::EncryptionFailure => ENCRYPTION_FAILURE,
            Self::KeyIdentifierMissing { .. } => KEY_IDENTIFIER_MISSING,
            Self::MissingConfig { .. } => MISSING_CONFIG,
            Self::ConfigStore { .. } => CONFIG_STORE_UNAVAILABLE,
            Self::InvalidDirective(_) => INVALID_DIRECTIVE,
            Self::Config(_) | Self::Vault(_) => INVALID_CONFIGURATION,
        }
    }
}

// Error codes for machine-readable output
/// Vault token absent.
pub const MISSING_AUTH_TOKEN: &str = "MISSING_AUTH_TOKEN";
/// Secret absent without fallback.
pub const MISSING_SECRET: &str = "MISSING_SECRET";
/// KMS returned no ciphertext.
pub const ENCRYPTION_FAILURE: &str = "ENCRYPTION_FAILURE";
/// No KMS key for the stage.
pub const KEY_IDENTIFIER_MISSING: &str = "KEY_IDENTIFIER_MISSING";
/// Config key absent without fallback.
pub const MISSING_CONFIG: &str = "MISSING_CONFIG";
/// Configuration store transport failure.
pub const CONFIG_STORE_UNAVAILABLE: &str = "CONFIG_STORE_UNAVAILABLE";
/// Unparseable directive.
pub const INVALID_DIRECTIVE: &str = "INVALID_DIRECTIVE";
/// Invalid definition or settings.
pub const INVALID_CONFIGURATION: &str = "INVALID_CONFIGURATION";
