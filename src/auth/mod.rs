//! Request identity: credential extraction, the two trust sources and the
//! resolver that orders them.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod delegated;
pub mod legacy;
pub mod resolver;

pub use delegated::DelegatedAuthClient;
pub use legacy::{LegacyClaims, LegacyTokenVerifier};
pub use resolver::{IdentityResolver, Resolution};

/// Caller identity resolved for a single request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Identity {
    /// Builds an identity from a raw JSON id. Strings are taken as-is and
    /// integers rendered in decimal; anything else, or a blank id, is rejected.
    pub fn from_raw_id(id: &Value, email: Option<String>, role: Option<String>) -> Option<Self> {
        let id = match id {
            Value::String(s) if !s.trim().is_empty() => s.clone(),
            Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
            _ => return None,
        };

        Some(Self { id, email, role })
    }
}

/// Raw `Authorization` header value as sent by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        Self::new(value.trim())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Token part of a `Bearer <token>` credential.
    pub fn bearer_token(&self) -> Option<&str> {
        let token = self.0.strip_prefix("Bearer ")?.trim();
        (!token.is_empty()).then_some(token)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// A trust source that can turn a credential into an identity.
///
/// Implementations never fail outward: rejection, transport trouble and
/// malformed input all come back as `None`.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn identify(&self, credential: &Credential) -> Option<Identity>;
}
