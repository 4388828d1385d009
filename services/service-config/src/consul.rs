//! Consul KV client for plain configuration values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode, header::ACCEPT};
use rust_common::{HttpConfig, PlatformError, build_http_client, error_for_status};
use serde::Deserialize;
use tracing::{debug, instrument};

const CONSUL_TOKEN_HEADER: &str = "X-Consul-Token";

/// One entry of a Consul KV read response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KvEntry {
    #[serde(default)]
    value: Option<String>,
}

/// Consul KV reader.
#[derive(Clone)]
pub struct ConsulClient {
    http: Client,
    token: Option<String>,
}

impl std::fmt::Debug for ConsulClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsulClient")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl ConsulClient {
    /// Create a new Consul client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            http: build_http_client(config)?,
            token: None,
        })
    }

    /// Send `token` as ACL token with every request.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Read the value stored at the KV `url`.
    ///
    /// Returns `Ok(None)` when the key does not exist or holds no value.
    ///
    /// # Errors
    ///
    /// Returns a [`PlatformError`] for transport failures, unexpected
    /// statuses and undecodable payloads.
    #[instrument(skip(self))]
    pub async fn get(&self, url: &str) -> Result<Option<String>, PlatformError> {
        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.header(CONSUL_TOKEN_HEADER, token);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Key not found in Consul");
            return Ok(None);
        }
        error_for_status(response.status(), url)?;

        let body = response.bytes().await?;
        let entries: Vec<KvEntry> = serde_json::from_slice(&body)?;

        match entries.into_iter().next().and_then(|entry| entry.value) {
            Some(encoded) => decode_value(&encoded).map(Some),
            None => Ok(None),
        }
    }
}

/// Decode a base64 KV value into UTF-8 text.
fn decode_value(encoded: &str) -> Result<String, PlatformError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| PlatformError::invalid_response(format!("KV value is not base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| PlatformError::invalid_response(format!("KV value is not UTF-8: {e}")))
}
