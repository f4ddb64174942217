use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::rate_limit::{RateLimitKey, RateLimiter};

/// Per-route throttle settings handed to [`throttle`] as middleware state.
#[derive(Clone)]
pub struct Throttle {
    pub limiter: Arc<RateLimiter>,
    pub operation: &'static str,
    pub limit: u32,
}

impl Throttle {
    pub fn new(limiter: Arc<RateLimiter>, operation: &'static str, limit: u32) -> Self {
        Self {
            limiter,
            operation,
            limit,
        }
    }
}

/// Counts the request against the caller's quota for this operation. The
/// caller is keyed by identity when one was resolved, otherwise by address.
pub async fn throttle(
    State(throttle): State<Throttle>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = RateLimitKey::for_request(&request).scoped(throttle.operation);
    let decision = throttle.limiter.check(&key, throttle.limit);

    if !decision.allowed {
        return Err(ApiError::too_many_requests("Rate limit exceeded", throttle.limit));
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(throttle.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));

    Ok(response)
}
