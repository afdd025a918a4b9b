use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use snapflow_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use snapflow_types::models::User;

use crate::error::ApiError;
use crate::state::{AppState, db_call};

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Json(req) = payload?;

    let name = req.name.trim().to_string();
    let email = req.email.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if !email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".into()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    // Uniqueness is a pre-check, not a constraint
    let lookup = email.clone();
    if db_call(&state, move |db| db.find_user_by_email(&lookup))
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("User exists".into()));
    }

    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        role: req.role,
        password: hash_password(&req.password)?,
        created_at: Utc::now(),
    };

    info!("Registering user {} ({})", user.id, user.role);
    db_call(&state, move |db| db.create_user(&user)).await?;

    Ok(Json(RegisterResponse {
        message: "Registered".into(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;

    let email = req.email.trim().to_string();
    let user = db_call(&state, move |db| db.find_user_by_email(&email))
        .await?
        .filter(|user| verify_password(&req.password, &user.password))
        .ok_or(ApiError::InvalidCredentials)?;

    let token = state.tokens.issue(&user).map_err(|e| {
        error!("Failed to sign token for {}: {}", user.id, e);
        ApiError::Internal
    })?;

    Ok(Json(LoginResponse {
        token,
        role: user.role,
    }))
}

/// Argon2id with a fresh random salt, encoded as a PHC string.
fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::Internal
        })
}

fn verify_password(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is unreadable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let a = hash_password("correct horse").unwrap();
        let b = hash_password("correct horse").unwrap();

        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
        assert!(verify_password("correct horse", &a));
        assert!(!verify_password("battery staple", &a));
    }

    #[test]
    fn corrupt_hash_never_verifies() {
        assert!(!verify_password("anything", "plaintext"));
    }
}
