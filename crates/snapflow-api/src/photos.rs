use axum::{
    Extension, Json,
    extract::multipart::{Multipart, MultipartRejection},
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Path, Query, State},
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use snapflow_db::FeedPage;
use snapflow_db::photos::DEFAULT_PAGE_SIZE;
use snapflow_types::api::{Claims, CommentRequest, ShareResponse};
use snapflow_types::models::{Comment, Photo, ReactionKind, Reactions, UnknownReaction};

use crate::error::ApiError;
use crate::state::{AppState, db_call};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Cursor: id of the oldest photo on the previous page.
    pub before: Option<Uuid>,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

struct ImageField {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

/// POST /api/photos: multipart `image` + `title`, creators only.
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Photo>, ApiError> {
    // Checked before a single byte of the body is read
    if !claims.role.can_upload() {
        warn!("User {} ({}) tried to upload", claims.id, claims.role);
        return Err(ApiError::Forbidden);
    }

    let mut multipart = multipart?;
    let mut title = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(field.text().await?),
            "image" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                image = Some(ImageField {
                    filename,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("Title is required".into()))?;
    let image = image
        .filter(|img| !img.bytes.is_empty())
        .ok_or_else(|| ApiError::Validation("Image is required".into()))?;
    if !image.content_type.starts_with("image/") {
        return Err(ApiError::Validation("Only image uploads are accepted".into()));
    }

    // Blob first: if this fails there is no record to clean up
    let stored = state
        .media
        .upload(image.bytes, &image.content_type, &image.filename)
        .await?;

    let photo = Photo::new(stored.url, title, claims.name.clone());
    let record = photo.clone();
    if let Err(e) = db_call(&state, move |db| db.create_photo(&record)).await {
        if let Err(cleanup) = state.media.delete(&stored.name).await {
            warn!("Orphaned media {} after failed insert: {}", stored.name, cleanup);
        }
        return Err(e);
    }

    info!("Photo {} uploaded by {}", photo.id, claims.name);
    Ok(Json(photo))
}

/// GET /api/photos: newest first, paginated with `limit` and `before`.
pub async fn list_feed(
    State(state): State<AppState>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> Result<Json<Vec<Photo>>, ApiError> {
    let Query(query) = query?;
    let page = FeedPage {
        limit: query.limit,
        before: query.before,
    };

    let photos = db_call(&state, move |db| db.list_photos(page)).await?;
    Ok(Json(photos))
}

pub async fn react(
    State(state): State<AppState>,
    Path((photo_id, kind)): Path<(String, String)>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Reactions>, ApiError> {
    let id = parse_photo_id(&photo_id)?;
    let kind: ReactionKind = kind
        .parse()
        .map_err(|e: UnknownReaction| ApiError::Validation(e.to_string()))?;

    let reactions = db_call(&state, move |db| db.add_reaction(&id, kind))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(reactions))
}

pub async fn comment(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let id = parse_photo_id(&photo_id)?;
    let Json(req) = payload?;

    let text = req.text.trim().to_string();
    if text.is_empty() {
        return Err(ApiError::Validation("Comment text is required".into()));
    }

    let entry = Comment {
        user: claims.name,
        text,
    };
    let comments = db_call(&state, move |db| db.add_comment(&id, entry))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(comments))
}

pub async fn share(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<ShareResponse>, ApiError> {
    let id = parse_photo_id(&photo_id)?;

    let shares = db_call(&state, move |db| db.add_share(&id))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(ShareResponse { shares }))
}

/// A malformed id can't name any photo.
fn parse_photo_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}
