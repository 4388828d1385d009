//! Secret types and Vault response structures.

use rust_common::PlatformError;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;

/// Environment variable holding the Vault token.
pub const VAULT_TOKEN_ENV: &str = "VAULT_TOKEN";

/// Vault bearer credential.
///
/// Always non-empty. Never printed: `Debug` shows `[REDACTED]`.
#[derive(Clone)]
pub struct VaultToken(SecretString);

impl VaultToken {
    /// Wrap a token value, rejecting empty ones.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            return None;
        }
        Some(Self(SecretString::from(value)))
    }

    /// Read the token from [`VAULT_TOKEN_ENV`].
    ///
    /// Meant to be called once at startup; the result is then passed
    /// explicitly to whoever talks to Vault.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var(VAULT_TOKEN_ENV).ok().and_then(Self::new)
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for VaultToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VaultToken").field(&"[REDACTED]").finish()
    }
}

/// Vault read response: `{ "data": { "value": "<string>" } }`.
///
/// Every level is optional; a missing level means "no secret".
#[derive(Debug, Default, Deserialize)]
pub struct SecretResponse {
    /// Response payload
    #[serde(default)]
    pub data: Option<SecretData>,
}

/// Payload of a [`SecretResponse`].
#[derive(Default, Deserialize)]
pub struct SecretData {
    /// The secret value
    #[serde(default)]
    pub value: Option<String>,
}

impl fmt::Debug for SecretData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretData")
            .field("value", &self.value.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl SecretResponse {
    /// Extract the secret value, treating an empty string as absent.
    #[must_use]
    pub fn into_value(self) -> Option<SecretString> {
        let SecretResponse { data } = self;
        match data {
            Some(SecretData { value: Some(value) }) if !value.is_empty() => {
                Some(SecretString::from(value))
            }
            _ => None,
        }
    }
}

/// Parse a Vault response body.
///
/// An empty body or a JSON `null` yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`PlatformError::Serialization`] when the body is not valid JSON
/// of the expected shape.
pub fn parse_secret_body(body: &[u8]) -> Result<Option<SecretString>, PlatformError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let response: Option<SecretResponse> = serde_json::from_slice(body)?;
    Ok(response.and_then(SecretResponse::into_value))
}
