//! Deployment-time resolution of `serviceConfig` and `secretConfig` directives.
//!
//! - `serviceConfig:path[, fallback]` reads a plain value from Consul KV
//! - `secretConfig:path[, fallback]` reads a secret from Vault and returns its
//!   AWS KMS ciphertext as base64, so only ciphertext reaches the artifact

pub mod cli;
pub mod config;
pub mod consul;
pub mod directive;
pub mod error;
pub mod resolver;
pub mod secret;

pub use cli::Cli;
pub use config::{KmsKeySource, PluginConfig, ServiceDefinition, Settings};
pub use consul::ConsulClient;
pub use directive::{Directive, DirectiveKind};
pub use error::{Result, ServiceConfigError};
pub use resolver::{ResolvedValue, ServiceConfigResolver};
pub use secret::{EncryptedSecret, SecretPipeline};
