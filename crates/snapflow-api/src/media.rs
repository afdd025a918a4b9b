use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use snapflow_media::StorageError;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /media/{name}: serves an uploaded object with its stored content type.
pub async fn serve_media(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let object = match state.media.fetch(&name).await {
        Ok(Some(object)) => object,
        Ok(None) | Err(StorageError::InvalidName(_)) => return Err(ApiError::NotFound),
        Err(e) => return Err(e.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            // Names are never reused
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        object.bytes,
    ))
}
