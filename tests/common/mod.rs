#![allow(dead_code)]

use std::collections::HashMap;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use casting_api::config::AppConfig;

pub const LEGACY_SECRET: &str = "integration-legacy-secret";
pub const SERVICE_TOKEN: &str = "integration-service-token";

/// Signs a legacy token with the shared test secret.
pub fn legacy_token(claims: Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(LEGACY_SECRET.as_bytes()),
    )
    .expect("test token should encode")
}

pub fn valid_legacy_token(id: Value) -> String {
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    legacy_token(json!({"id": id, "email": "legacy@example.com", "role": "talent", "exp": exp}))
}

pub fn expired_legacy_token(id: Value) -> String {
    let exp = (Utc::now() - Duration::minutes(5)).timestamp();
    legacy_token(json!({"id": id, "exp": exp}))
}

/// Configuration pointing both outbound services at `auth_url` / `dmapi_url`.
pub fn config(auth_url: &str, dmapi_url: &str, extra: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = [
        ("DELEGATED_AUTH_URL", auth_url),
        ("DMAPI_URL", dmapi_url),
        ("LEGACY_JWT_SECRET", LEGACY_SECRET),
        ("SERVICE_TOKEN", SERVICE_TOKEN),
        ("DELEGATED_AUTH_TIMEOUT_MS", "2000"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    AppConfig::from_lookup(|name| vars.get(name).cloned()).expect("test config should load")
}
