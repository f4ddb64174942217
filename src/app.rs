use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{DelegatedAuthClient, IdentityResolver, LegacyTokenVerifier};
use crate::config::{AppConfig, ConfigError, RateLimitConfig};
use crate::handlers::{protected, public};
use crate::media::{DmapiClient, MediaStore};
use crate::middleware::{require_identity, throttle, Throttle};
use crate::rate_limit::RateLimiter;
use crate::service_token::ServiceToken;

/// Per-route attempt limits, counted within the limiter's window.
#[derive(Clone, Copy, Debug)]
pub struct RouteLimits {
    pub whoami: u32,
    pub media_delete: u32,
    /// Failed authentication attempts per client address.
    pub auth_failure: u32,
}

impl From<&RateLimitConfig> for RouteLimits {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            whoami: config.whoami_limit,
            media_delete: config.media_delete_limit,
            auth_failure: config.auth_failure_limit,
        }
    }
}

/// Shared collaborators injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: IdentityResolver,
    pub limiter: Arc<RateLimiter>,
    pub media: Arc<dyn MediaStore>,
    pub limits: RouteLimits,
    pub auth_budget: Duration,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let service_token = ServiceToken::from_config(&config.auth);

        let delegated = DelegatedAuthClient::from_config(&config.auth)
            .context("failed to build delegated auth client")?;
        let legacy = LegacyTokenVerifier::from_config(&config.auth)?;
        let limiter = RateLimiter::from_config(&config.rate_limit)
            .ok_or(ConfigError::Zero("RATE_LIMIT_CAPACITY"))?;
        let media = DmapiClient::from_config(&config.media, service_token);

        Ok(Self {
            resolver: IdentityResolver::new(Arc::new(delegated), Arc::new(legacy)),
            limiter: Arc::new(limiter),
            media: Arc::new(media),
            limits: RouteLimits::from(&config.rate_limit),
            // Leave room for the legacy check after a slow delegated answer.
            auth_budget: config.auth.delegated_timeout + Duration::from_secs(1),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(protected_routes(&state))
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    let whoami = Throttle::new(state.limiter.clone(), "whoami", state.limits.whoami);
    let media_delete = Throttle::new(state.limiter.clone(), "media_delete", state.limits.media_delete);

    Router::new()
        .route(
            "/api/auth/whoami",
            get(protected::auth::whoami_get).route_layer(from_fn_with_state(whoami, throttle)),
        )
        .route(
            "/api/media/:id",
            delete(protected::media::media_delete).route_layer(from_fn_with_state(media_delete, throttle)),
        )
        // Runs before the per-route throttles so they can key on identity;
        // failed resolutions are throttled by client address inside it.
        .route_layer(from_fn_with_state(state.clone(), require_identity))
}
