//! Property-based tests for Vault client.
//!
//! Tests validate:
//! - Token and secret non-exposure in debug output
//! - Response shape handling for arbitrary secret values

use proptest::prelude::*;
use secrecy::ExposeSecret;
use vault_client::{VaultError, VaultToken, secrets::parse_secret_body};

// Strategy for generating secret values
fn secret_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!@#$%^&*]{8,64}"
}

// Strategy for generating secret paths
fn secret_path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("secret/path".to_string()),
        Just("secret/data/api-keys/service-a".to_string()),
        prop::collection::vec("[a-z][a-z0-9_]{2,10}", 1..4)
            .prop_map(|segments| format!("vault/{}", segments.join("/"))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* token value, the Debug implementation SHALL NOT expose it.
    #[test]
    fn prop_token_not_exposed_in_debug(token in secret_value_strategy()) {
        let vault_token = VaultToken::new(token.clone()).unwrap();
        let debug_output = format!("{vault_token:?}");

        prop_assert!(!debug_output.contains(&token), "Debug output should not contain token");
        prop_assert!(debug_output.contains("[REDACTED]"));
    }

    /// *For any* non-empty string at `data.value`, parsing returns exactly that string.
    #[test]
    fn prop_value_extracted_verbatim(value in "\\PC{1,64}") {
        let body = serde_json::json!({ "data": { "value": value } }).to_string();
        let parsed = parse_secret_body(body.as_bytes()).unwrap().unwrap();

        prop_assert_eq!(parsed.expose_secret(), value.as_str());
    }

    /// *For any* path, the missing secret message names the path and nothing else secret.
    #[test]
    fn prop_missing_secret_names_path(path in secret_path_strategy()) {
        let err = VaultError::missing_secret(path.clone());
        prop_assert_eq!(err.to_string(), format!("Missing secret in Vault at {path}"));
    }
}

#[test]
fn test_response_shapes_without_value() {
    for body in [r#"{"data":{}}"#, "{}", "null", ""] {
        assert!(parse_secret_body(body.as_bytes()).unwrap().is_none());
    }
}
