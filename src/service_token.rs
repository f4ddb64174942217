//! Service credential attached to outbound calls to platform services.
//!
//! Both the delegated auth client and the DMAPI media client depend on this
//! module; it depends on neither of them.

use reqwest::RequestBuilder;

use crate::config::AuthConfig;

pub const SERVICE_TOKEN_HEADER: &str = "x-service-token";

#[derive(Clone)]
pub struct ServiceToken(String);

impl ServiceToken {
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn from_config(config: &AuthConfig) -> Option<Self> {
        config.service_token.clone().and_then(Self::new)
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(SERVICE_TOKEN_HEADER, &self.0)
    }
}

impl std::fmt::Debug for ServiceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ServiceToken(<redacted>)")
    }
}

/// Attaches the service token when one is configured.
pub fn authorize(request: RequestBuilder, token: Option<&ServiceToken>) -> RequestBuilder {
    match token {
        Some(token) => token.apply(request),
        None => request,
    }
}
