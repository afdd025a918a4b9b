mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use snapflow_api::token::TokenService;
use snapflow_api::{AppState, AppStateInner};
use snapflow_db::Database;
use snapflow_media::LocalMediaStore;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapflow=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Clients are built once here and injected into the router
    let db = Database::open(&config.db_path)?;
    let media = LocalMediaStore::new(config.media_dir.clone(), &config.public_url).await?;
    let tokens = TokenService::new(
        &config.jwt_secret,
        chrono::Duration::hours(config.token_ttl_hours),
    );

    let state: AppState = Arc::new(AppStateInner {
        db,
        media: Arc::new(media),
        tokens,
    });

    let app = snapflow_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("SnapFlow listening on {}", addr);
    info!("Serving media from {} at {}/media", config.media_dir.display(), config.public_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
}
