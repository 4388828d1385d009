//! End-to-end directive resolution against mock Consul and Vault servers.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kms_client::MockKms;
use rust_common::HttpConfig;
use service_config::{
    ConsulClient, Directive, ResolvedValue, SecretPipeline, ServiceConfigError,
    ServiceConfigResolver, ServiceDefinition,
};
use std::sync::Arc;
use std::time::Duration;
use vault_client::{VaultClient, VaultConfig, VaultToken};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    resolver: ServiceConfigResolver,
    kms: Arc<MockKms>,
}

fn definition(consul: &MockServer, vault: &MockServer, extra_plugin: &str) -> ServiceDefinition {
    let yaml = format!(
        "provider:\n  stage: stage\n  region: eu-west-1\n\
         custom:\n  service_config_plugin:\n    consulAddr: {}\n    consulPrefix: prefix\n    vaultAddr: {}\n{extra_plugin}",
        consul.uri(),
        vault.uri(),
    );
    ServiceDefinition::from_yaml_str(&yaml).unwrap()
}

fn harness(definition: ServiceDefinition, token: Option<VaultToken>) -> Harness {
    let http = HttpConfig::default().with_timeout(Duration::from_millis(500));
    let vault =
        VaultClient::new(&VaultConfig::default().with_timeout(Duration::from_millis(500))).unwrap();
    let kms = Arc::new(MockKms::new());

    let resolver = ServiceConfigResolver::new(
        definition,
        ConsulClient::new(&http).unwrap(),
        SecretPipeline::new(Arc::new(vault), token),
        kms.clone(),
    );
    Harness { resolver, kms }
}

fn literal_key() -> &'static str {
    "    kmsKeyId:\n      stage: kmsKeyId\n"
}

async fn mount_consul(server: &MockServer, key: &str, value: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/kv/prefix/{key}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "Key": key, "Value": STANDARD.encode(value) }])),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_vault(server: &MockServer, secret_path: &str, value: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/{secret_path}")))
        .and(header("X-Vault-Token", "vault_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": { "value": value } })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_service_config_reads_consul_kv() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    mount_consul(&consul, "config_path/key", "a sample value").await;
    let h = harness(definition(&consul, &vault, ""), None);

    let value = h
        .resolver
        .get_service_config("serviceConfig:config_path/key")
        .await
        .unwrap();

    assert_eq!(value, "a sample value");
}

#[tokio::test]
async fn test_service_config_fallback_on_missing_key() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/prefix/config_path/absent"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&consul)
        .await;
    let h = harness(definition(&consul, &vault, ""), None);

    let value = h
        .resolver
        .get_service_config("serviceConfig:config_path/absent, foo")
        .await
        .unwrap();
    assert_eq!(value, "foo");

    let err = h
        .resolver
        .get_service_config("serviceConfig:config_path/absent")
        .await
        .unwrap_err();
    assert!(matches!(&err, ServiceConfigError::MissingConfig { path } if path == "config_path/absent"));
}

#[tokio::test]
async fn test_service_config_unavailable_ignores_fallback() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/prefix/config_path/key"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&consul)
        .await;
    let h = harness(definition(&consul, &vault, ""), None);

    let err = h
        .resolver
        .get_service_config("serviceConfig:config_path/key, foo")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceConfigError::ConfigStore { .. }));
}

#[tokio::test]
async fn test_secret_config_with_stage_key_id() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    mount_vault(&vault, "vault/my_secret/secret", "fake_secret").await;
    let h = harness(definition(&consul, &vault, literal_key()), VaultToken::new("vault_token"));

    let value = h
        .resolver
        .get_secret_config("secretConfig:vault/my_secret/secret")
        .await
        .unwrap();

    assert_eq!(value, "ZW5jcnlwdGVkOmZha2Vfc2VjcmV0");
    assert_eq!(h.kms.calls()[0].key_id, "kmsKeyId");
}

#[tokio::test]
async fn test_secret_config_key_id_from_consul() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    mount_consul(&consul, "path/to/key", "consulKeyId").await;
    mount_vault(&vault, "vault/my_secret/secret", "fake_secret").await;
    let extra = format!("    kmsKeyConsulPath: path/to/key\n{}", literal_key());
    let h = harness(definition(&consul, &vault, &extra), VaultToken::new("vault_token"));

    h.resolver
        .get_secret_config("secretConfig:vault/my_secret/secret")
        .await
        .unwrap();

    assert_eq!(h.kms.calls()[0].key_id, "consulKeyId");
}

#[tokio::test]
async fn test_secret_config_fallback() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vault/absent"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&vault)
        .await;
    let h = harness(definition(&consul, &vault, literal_key()), VaultToken::new("vault_token"));

    let value = h
        .resolver
        .get_secret_config("secretConfig:vault/absent, fallback")
        .await
        .unwrap();

    assert_eq!(value, "ZW5jcnlwdGVkOmZhbGxiYWNr");
}

#[tokio::test]
async fn test_secret_config_without_key_id_fails_per_stage() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&vault)
        .await;

    for stage in ["dev", "green"] {
        let definition = definition(&consul, &vault, "").with_stage(stage);
        let h = harness(definition, VaultToken::new("vault_token"));

        let err = h
            .resolver
            .get_secret_config("secretConfig:vault/my_secret/secret")
            .await
            .unwrap_err();

        assert!(matches!(&err, ServiceConfigError::KeyIdentifierMissing { stage: s } if s == stage));
        assert_eq!(h.kms.call_count(), 0);
    }
}

#[tokio::test]
async fn test_secret_config_without_token_fails() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&vault)
        .await;
    let h = harness(definition(&consul, &vault, literal_key()), None);

    let err = h
        .resolver
        .get_secret_config("secretConfig:vault/my_secret/secret, fallback")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceConfigError::MissingAuthToken));
}

#[tokio::test]
async fn test_resolve_mixed_directives() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    mount_consul(&consul, "app/url", "https://example.com").await;
    mount_vault(&vault, "app/api_key", "fake_secret").await;
    let h = harness(definition(&consul, &vault, literal_key()), VaultToken::new("vault_token"));

    let config = h
        .resolver
        .resolve(&Directive::parse("${serviceConfig:app/url}").unwrap())
        .await
        .unwrap();
    let secret = h
        .resolver
        .resolve(&Directive::parse("secretConfig:app/api_key").unwrap())
        .await
        .unwrap();

    assert_eq!(config, ResolvedValue::Config("https://example.com".to_string()));
    assert!(matches!(secret, ResolvedValue::Secret(_)));
    assert_eq!(secret.as_str(), "ZW5jcnlwdGVkOmZha2Vfc2VjcmV0");
}

#[tokio::test]
async fn test_resolve_all_keeps_order() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    mount_consul(&consul, "app/url", "https://example.com").await;
    mount_vault(&vault, "app/api_key", "fake_secret").await;
    let h = harness(definition(&consul, &vault, literal_key()), VaultToken::new("vault_token"));
    let directives = [
        Directive::parse("secretConfig:app/api_key").unwrap(),
        Directive::parse("serviceConfig:app/url").unwrap(),
    ];

    let values = h.resolver.resolve_all(&directives).await.unwrap();

    let texts: Vec<&str> = values.iter().map(ResolvedValue::as_str).collect();
    assert_eq!(texts, ["ZW5jcnlwdGVkOmZha2Vfc2VjcmV0", "https://example.com"]);
}

#[tokio::test]
async fn test_resolve_all_returns_nothing_on_later_failure() {
    let consul = MockServer::start().await;
    let vault = MockServer::start().await;
    mount_consul(&consul, "app/url", "https://example.com").await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/prefix/app/absent"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&consul)
        .await;
    let h = harness(definition(&consul, &vault, ""), None);
    let directives = [
        Directive::parse("serviceConfig:app/url").unwrap(),
        Directive::parse("serviceConfig:app/absent").unwrap(),
    ];

    let err = h.resolver.resolve_all(&directives).await.unwrap_err();

    assert!(matches!(&err, ServiceConfigError::MissingConfig { path } if path == "app/absent"));
}
