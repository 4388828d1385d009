//! KMS client configuration.

use std::time::Duration;

/// KMS client configuration.
#[derive(Debug, Clone)]
pub struct KmsConfig {
    /// AWS region; the SDK default chain applies when unset
    pub region: Option<String>,
    /// Endpoint override, e.g. a local KMS emulator
    pub endpoint_url: Option<String>,
    /// Timeout for a whole encrypt operation
    pub operation_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for KmsConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            operation_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl KmsConfig {
    /// Set region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set endpoint override.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set operation timeout.
    #[must_use]
    pub const fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
