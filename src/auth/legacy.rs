use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Credential, Identity, IdentitySource};
use crate::config::{AuthConfig, ConfigError};

/// Payload of a legacy HS256 token.
#[derive(Debug, Serialize, Deserialize)]
pub struct LegacyClaims {
    pub id: Value,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: i64,
}

/// Verifies legacy tokens locally against a shared secret.
pub struct LegacyTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl LegacyTokenVerifier {
    /// Fails when the secret is empty; there is no built-in fallback secret.
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Self::new(&config.legacy_secret)
    }

    /// Verifies a raw `Authorization` value. The `Bearer ` prefix is required
    /// and stripped here, so callers pass the header value unchanged.
    pub fn verify(&self, credential: &str) -> Option<Identity> {
        let token = credential.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            return None;
        }

        let claims = match decode::<LegacyClaims>(token, &self.key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Legacy token rejected: {}", e);
                return None;
            }
        };

        let identity = Identity::from_raw_id(&claims.id, claims.email, claims.role);
        if identity.is_none() {
            tracing::debug!("Legacy token rejected: unusable id claim");
        }
        identity
    }
}

#[async_trait]
impl IdentitySource for LegacyTokenVerifier {
    fn name(&self) -> &'static str {
        "legacy"
    }

    async fn identify(&self, credential: &Credential) -> Option<Identity> {
        self.verify(credential.as_str())
    }
}
