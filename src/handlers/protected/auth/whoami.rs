// handlers/protected/auth/whoami.rs - GET /api/auth/whoami handler

use axum::extract::Extension;

use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};

/// Returns the identity resolved for this request.
pub async fn whoami_get(Extension(identity): Extension<Identity>) -> ApiResult<Identity> {
    Ok(ApiResponse::success(identity))
}
