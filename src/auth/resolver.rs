use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;

use super::{Credential, Identity, IdentitySource};

/// Which trust source, if any, vouched for a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Delegated(Identity),
    Legacy(Identity),
    Unauthenticated,
}

impl Resolution {
    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Resolution::Delegated(identity) | Resolution::Legacy(identity) => Some(identity),
            Resolution::Unauthenticated => None,
        }
    }

    pub fn source(&self) -> Option<&'static str> {
        match self {
            Resolution::Delegated(_) => Some("delegated"),
            Resolution::Legacy(_) => Some("legacy"),
            Resolution::Unauthenticated => None,
        }
    }
}

/// Resolves request identity from the delegated service first and the legacy
/// verifier second.
///
/// The delegated source is authoritative: when it accepts a credential the
/// legacy verifier is never consulted. The two are never run concurrently and
/// nothing is cached between requests.
#[derive(Clone)]
pub struct IdentityResolver {
    delegated: Arc<dyn IdentitySource>,
    legacy: Arc<dyn IdentitySource>,
}

impl IdentityResolver {
    pub fn new(delegated: Arc<dyn IdentitySource>, legacy: Arc<dyn IdentitySource>) -> Self {
        Self { delegated, legacy }
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        self.resolve_detailed(headers).await.into_identity()
    }

    /// Like [`resolve`](Self::resolve), but gives up after `budget`. The
    /// in-flight delegated call is dropped and no identity is produced.
    pub async fn resolve_within(&self, headers: &HeaderMap, budget: Duration) -> Option<Identity> {
        match tokio::time::timeout(budget, self.resolve(headers)).await {
            Ok(identity) => identity,
            Err(_) => {
                tracing::warn!("Identity resolution abandoned after {:?}", budget);
                None
            }
        }
    }

    pub async fn resolve_detailed(&self, headers: &HeaderMap) -> Resolution {
        let Some(credential) = Credential::from_headers(headers) else {
            return Resolution::Unauthenticated;
        };

        if let Some(identity) = self.delegated.identify(&credential).await {
            tracing::debug!("Request authenticated by {} source", self.delegated.name());
            return Resolution::Delegated(identity);
        }

        if let Some(identity) = self.legacy.identify(&credential).await {
            tracing::debug!("Request authenticated by {} source", self.legacy.name());
            return Resolution::Legacy(identity);
        }

        tracing::debug!("Credential rejected by all identity sources");
        Resolution::Unauthenticated
    }
}
