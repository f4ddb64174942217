use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{Credential, Identity, IdentitySource};
use crate::config::AuthConfig;
use crate::service_token::{self, ServiceToken};

/// Verdict body returned by the authentication service on success.
#[derive(Debug, Deserialize)]
struct AccountVerdict {
    #[serde(alias = "userId", alias = "user_id")]
    id: Value,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Forwards caller credentials to the external authentication service.
///
/// One request per call, no retries. Every failure mode collapses to `None`
/// so the resolver can move on to the legacy verifier.
pub struct DelegatedAuthClient {
    http: reqwest::Client,
    endpoint: Url,
    service_token: Option<ServiceToken>,
}

impl DelegatedAuthClient {
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        service_token: Option<ServiceToken>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint,
            service_token,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.delegated_auth_endpoint.clone(),
            config.delegated_timeout,
            ServiceToken::from_config(config),
        )
    }

    pub async fn validate(&self, credential: Option<&Credential>) -> Option<Identity> {
        let credential = credential?;

        let request = self
            .http
            .get(self.endpoint.clone())
            .header(header::AUTHORIZATION, credential.as_str());
        let request = service_token::authorize(request, self.service_token.as_ref());

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Delegated auth request to {} failed: {}", self.endpoint, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Delegated auth rejected credential with status {}", status);
            return None;
        }

        let verdict = match response.json::<AccountVerdict>().await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Delegated auth returned an unreadable body: {}", e);
                return None;
            }
        };

        Identity::from_raw_id(&verdict.id, verdict.email, verdict.role)
    }
}

#[async_trait]
impl IdentitySource for DelegatedAuthClient {
    fn name(&self) -> &'static str {
        "delegated"
    }

    async fn identify(&self, credential: &Credential) -> Option<Identity> {
        self.validate(Some(credential)).await
    }
}
