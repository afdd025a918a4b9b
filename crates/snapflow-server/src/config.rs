use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub media_dir: PathBuf,
    pub public_url: String,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("SNAPFLOW_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("SNAPFLOW_JWT_SECRET is unset or still a placeholder; set it in your environment or .env file");
        }

        let host = lookup("SNAPFLOW_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = match lookup("SNAPFLOW_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SNAPFLOW_PORT is not a valid port: {raw}"))?,
            None => 3000,
        };
        let db_path = lookup("SNAPFLOW_DB_PATH")
            .unwrap_or_else(|| "snapflow.db".into())
            .into();
        let media_dir = lookup("SNAPFLOW_MEDIA_DIR")
            .unwrap_or_else(|| "./media".into())
            .into();
        let public_url = lookup("SNAPFLOW_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let token_ttl_hours: i64 = match lookup("SNAPFLOW_TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SNAPFLOW_TOKEN_TTL_HOURS is not a number: {raw}"))?,
            None => 720, // 30 days
        };
        if token_ttl_hours <= 0 {
            bail!("SNAPFLOW_TOKEN_TTL_HOURS must be positive");
        }

        Ok(Self {
            jwt_secret,
            host,
            port,
            db_path,
            media_dir,
            public_url,
            token_ttl_hours,
        })
    }
}
