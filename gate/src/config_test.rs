use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

const REQUIRED: [(&str, &str); 4] = [
    (ENV_API_KEY, "key-123"),
    (ENV_PROJECT_ID, "demo-auth"),
    (ENV_MESSAGING_SENDER_ID, "4571"),
    (ENV_APP_ID, "1:4571:web:0652"),
];

#[test]
fn from_lookup_applies_project_defaults() {
    let config = IdentityConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
    assert_eq!(config.api_key, "key-123");
    assert_eq!(config.project_id, "demo-auth");
    assert_eq!(config.auth_domain, "demo-auth.firebaseapp.com");
    assert_eq!(config.storage_bucket, "demo-auth.firebasestorage.app");
    assert_eq!(config.messaging_sender_id, "4571");
    assert_eq!(config.app_id, "1:4571:web:0652");
    assert!(config.measurement_id.is_none());
}

#[test]
fn from_lookup_honors_optional_overrides() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push((ENV_AUTH_DOMAIN, "login.example.com"));
    pairs.push((ENV_STORAGE_BUCKET, "bucket.example.com"));
    pairs.push((ENV_MEASUREMENT_ID, "G-TEST"));
    let config = IdentityConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert_eq!(config.auth_domain, "login.example.com");
    assert_eq!(config.storage_bucket, "bucket.example.com");
    assert_eq!(config.measurement_id.as_deref(), Some("G-TEST"));
}

#[test]
fn from_lookup_reports_each_missing_required_var() {
    for skip in 0..REQUIRED.len() {
        let pairs: Vec<_> = REQUIRED
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, p)| *p)
            .collect();
        let err = IdentityConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Missing { var: REQUIRED[skip].0 });
    }
}

#[test]
fn from_lookup_treats_blank_as_missing_and_trims() {
    let mut pairs = REQUIRED.to_vec();
    pairs[0] = (ENV_API_KEY, "   ");
    let err = IdentityConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: ENV_API_KEY });

    pairs[0] = (ENV_API_KEY, "  key-9  ");
    let config = IdentityConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert_eq!(config.api_key, "key-9");
}

#[test]
fn debug_redacts_api_key() {
    let config = IdentityConfig::new("super-secret", "p", "1", "a");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn serializes_with_camel_case_keys() {
    let config = IdentityConfig::new("k", "proj", "42", "1:42:web:x");
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["apiKey"], "k");
    assert_eq!(json["authDomain"], "proj.firebaseapp.com");
    assert_eq!(json["messagingSenderId"], "42");
    assert!(json.get("measurementId").is_none());
}

#[test]
fn missing_error_names_variable() {
    let err = ConfigError::Missing { var: ENV_APP_ID };
    assert_eq!(err.to_string(), "missing required identity setting: IDENTITY_APP_ID");
}
