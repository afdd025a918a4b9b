use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, media, photos};

/// 20 MB upload limit for images
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/photos", get(photos::list_feed))
        .route("/media/{name}", get(media::serve_media))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/api/photos", post(photos::upload_photo))
        .route("/api/photos/{id}/react/{kind}", post(photos::react))
        .route("/api/photos/{id}/comment", post(photos::comment))
        .route("/api/photos/{id}/share", post(photos::share))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
