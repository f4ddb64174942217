// handlers/protected/media/delete.rs - DELETE /api/media/:id handler

use axum::extract::{Extension, Path, State};

use crate::app::AppState;
use crate::auth::Identity;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// Deletes a media item through DMAPI on behalf of the caller.
pub async fn media_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(media_id): Path<String>,
) -> ApiResult<()> {
    if !is_valid_media_id(&media_id) {
        return Err(ApiError::bad_request("Invalid media id"));
    }

    tracing::info!("Caller {} deleting media {}", identity.id, media_id);
    state.media.delete(&media_id).await?;

    Ok(ApiResponse::no_content())
}

fn is_valid_media_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
