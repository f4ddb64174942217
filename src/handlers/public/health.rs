use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::rate_limit::RateLimitStats;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub rate_limit: RateLimitStats,
}

pub async fn health(State(state): State<AppState>) -> ApiResult<HealthReport> {
    Ok(ApiResponse::success(HealthReport {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
        rate_limit: state.limiter.stats(),
    }))
}
