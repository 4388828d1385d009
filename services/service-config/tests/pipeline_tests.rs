//! Vault-to-KMS pipeline tests against a mock Vault server.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kms_client::{MockBehavior, MockKms};
use service_config::{SecretPipeline, ServiceConfigError};
use std::sync::Arc;
use std::time::Duration;
use vault_client::{VaultClient, VaultConfig, VaultToken};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pipeline(token: Option<VaultToken>) -> SecretPipeline {
    let vault =
        VaultClient::new(&VaultConfig::default().with_timeout(Duration::from_millis(500))).unwrap();
    SecretPipeline::new(Arc::new(vault), token)
}

fn token() -> Option<VaultToken> {
    VaultToken::new("vault_token")
}

fn base_url(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

async fn mount_secret(server: &MockServer, secret_path: &str, value: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{secret_path}")))
        .and(header("X-Vault-Token", "vault_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": { "value": value } })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_secret_is_encrypted_and_encoded() {
    let server = MockServer::start().await;
    mount_secret(&server, "secret/path", "fake_secret").await;
    let kms = MockKms::new();

    let encrypted = pipeline(token())
        .retrieve_and_encrypt("secret/path", &base_url(&server), &kms, "kmsKeyId", None)
        .await
        .unwrap();

    assert_eq!(encrypted.value(), "ZW5jcnlwdGVkOmZha2Vfc2VjcmV0");
    let calls = kms.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].key_id, "kmsKeyId");
    assert_eq!(calls[0].plaintext, b"fake_secret");
}

#[tokio::test]
async fn test_not_found_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/path/to/secret"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    let kms = MockKms::new();

    let encrypted = pipeline(token())
        .retrieve_and_encrypt("path/to/secret", &base_url(&server), &kms, "kmsKeyId", Some("fallback"))
        .await
        .unwrap();

    assert_eq!(encrypted.value(), "ZW5jcnlwdGVkOmZhbGxiYWNr");
}

#[tokio::test]
async fn test_server_errors_use_fallback() {
    for status in [403, 500, 503] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/path/to/secret"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        let kms = MockKms::new();

        let encrypted = pipeline(token())
            .retrieve_and_encrypt("path/to/secret", &base_url(&server), &kms, "kmsKeyId", Some("fb"))
            .await
            .unwrap();

        assert_eq!(encrypted.value(), STANDARD.encode("encrypted:fb"));
    }
}

#[tokio::test]
async fn test_not_found_without_fallback_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secret/path"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let kms = MockKms::new();

    let err = pipeline(token())
        .retrieve_and_encrypt("secret/path", &base_url(&server), &kms, "kmsKeyId", None)
        .await
        .unwrap_err();

    assert!(matches!(&err, ServiceConfigError::MissingSecret { path } if path == "secret/path"));
    assert_eq!(kms.call_count(), 0);
}

#[tokio::test]
async fn test_missing_token_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let kms = MockKms::new();

    let err = pipeline(None)
        .retrieve_and_encrypt("path/to/secret", &base_url(&server), &kms, "kmsKeyId", Some("fallback"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceConfigError::MissingAuthToken));
    assert_eq!(kms.call_count(), 0);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_missing_ciphertext_fails() {
    let server = MockServer::start().await;
    mount_secret(&server, "path/to/secret", "fake_secret").await;
    let kms = MockKms::new().with_behavior(MockBehavior::NoCiphertext);

    let err = pipeline(token())
        .retrieve_and_encrypt("path/to/secret", &base_url(&server), &kms, "kmsKeyId", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceConfigError::EncryptionFailure));
    assert!(!err.to_string().contains("fake_secret"));
}

#[tokio::test]
async fn test_pipeline_is_reusable_across_calls() {
    let server = MockServer::start().await;
    mount_secret(&server, "app/one", "first").await;
    mount_secret(&server, "app/two", "second").await;
    let kms = MockKms::new();
    let pipeline = pipeline(token());

    let one = pipeline
        .retrieve_and_encrypt("app/one", &base_url(&server), &kms, "key", None)
        .await
        .unwrap();
    let two = pipeline
        .retrieve_and_encrypt("app/two", &base_url(&server), &kms, "key", None)
        .await
        .unwrap();

    assert_eq!(one.value(), STANDARD.encode("encrypted:first"));
    assert_eq!(two.value(), STANDARD.encode("encrypted:second"));
}
