//! HashiCorp Vault client for deployment-time secret resolution.
//!
//! Reads a single secret value per call and reports every way of not getting
//! it as [`VaultError::MissingSecret`].

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod secrets;

pub use client::VaultClient;
pub use config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use provider::SecretStore;
pub use secrets::{VAULT_TOKEN_ENV, VaultToken};
