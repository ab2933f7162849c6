use std::sync::Arc;

use anyhow::Context;
use server::config::Config;
use sgf_core::DiagramRenderer;
use sgf_render::BoardRenderer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    tracing::info!(
        max_bytes = config.max_bytes,
        max_board_size = config.max_board_size,
        "Loaded configuration"
    );

    let renderer: Arc<dyn DiagramRenderer> = Arc::new(BoardRenderer::new());
    let addr = format!("{}:{}", config.host, config.port);
    let app = server::app(config, renderer);

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
