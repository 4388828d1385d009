//! AWS KMS client.

use crate::client::{EncryptResponse, KmsClient};
use crate::config::KmsConfig;
use crate::error::{KmsError, KmsResult};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig, timeout::TimeoutConfig};
use aws_sdk_kms::config::Region;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::Client;
use tracing::{debug, info};

/// AWS KMS handle.
#[derive(Debug, Clone)]
pub struct AwsKms {
    client: Client,
}

impl AwsKms {
    /// Build a client from the AWS default credential chain and `config`.
    pub async fn connect(config: &KmsConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }

        Self::from_sdk_config(&loader.load().await, config)
    }

    /// Build a client from an already loaded SDK configuration.
    ///
    /// Timeouts and the endpoint override of `config` are applied on top of
    /// `shared`; its region is not, the shared configuration owns the region.
    #[must_use]
    pub fn from_sdk_config(shared: &SdkConfig, config: &KmsConfig) -> Self {
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(config.operation_timeout)
            .connect_timeout(config.connect_timeout)
            .build();

        let mut builder = aws_sdk_kms::config::Builder::from(shared).timeout_config(timeouts);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        info!(
            region = shared.region().map(ToString::to_string).as_deref().unwrap_or("default"),
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            "KMS client configured"
        );

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl KmsClient for AwsKms {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> KmsResult<EncryptResponse> {
        let output = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(Blob::new(plaintext))
            .send()
            .await
            .map_err(|e| KmsError::service(DisplayErrorContext(&e).to_string()))?;

        debug!(key_id, "KMS encrypt completed");
        Ok(EncryptResponse {
            ciphertext_blob: output.ciphertext_blob().map(|blob| blob.as_ref().to_vec()),
        })
    }
}
