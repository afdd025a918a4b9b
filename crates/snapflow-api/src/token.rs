use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use snapflow_types::api::Claims;
use snapflow_types::models::User;

use crate::error::ApiError;

/// Issues and verifies stateless HS256 session tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> anyhow::Result<String> {
        let exp = (Utc::now() + self.ttl).timestamp();
        let claims = Claims {
            id: user.id,
            role: user.role,
            name: user.name.clone(),
            exp: usize::try_from(exp).unwrap_or(0),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Bad signatures, expired tokens and garbage all come back as
    /// `Forbidden`; a missing token is the caller's `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ApiError::Forbidden)
    }
}
