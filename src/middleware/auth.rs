use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::rate_limit::RateLimitKey;

/// Resolves the caller's identity and stores it in request extensions.
/// Requests nobody vouches for are answered with 401, or 429 once the client
/// address has used up its failed attempts for the window.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let resolved = state
        .resolver
        .resolve_within(request.headers(), state.auth_budget)
        .await;

    let Some(identity) = resolved else {
        return Err(reject_unauthenticated(&state, &request));
    };

    tracing::debug!("Resolved caller {}", identity.id);
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

fn reject_unauthenticated(state: &AppState, request: &Request) -> ApiError {
    let key = RateLimitKey::for_request(request).scoped("auth_failure");
    let limit = state.limits.auth_failure;

    if state.limiter.check(&key, limit).allowed {
        ApiError::unauthorized("Authentication required")
    } else {
        tracing::warn!("Too many failed authentication attempts from {}", key);
        ApiError::too_many_requests("Too many failed authentication attempts", limit)
    }
}
