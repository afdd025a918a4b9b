use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Extract and validate the bearer token, then attach its claims to the
/// request for handlers to pick up via `Extension<Claims>`.
///
/// No header (or an empty token) is 401; anything present but unusable is 403.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::Unauthorized)?
        .to_str()
        .map_err(|_| ApiError::Forbidden)?;

    if auth_header.trim_end() == "Bearer" {
        return Err(ApiError::Unauthorized);
    }

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Forbidden)?
        .trim();

    let claims = state.tokens.verify(token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
