pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Router,
};
use sgf_core::DiagramRenderer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::AppError;

/// Build the application router.
pub fn app(config: Config, renderer: Arc<dyn DiagramRenderer>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/sgf/info", post(routes::sgf::info))
        .route("/api/sgf/diagram", post(routes::sgf::diagram))
        .layer(DefaultBodyLimit::max(config.body_limit()))
        .layer(Extension(renderer))
        .layer(Extension(config))
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
}

/// A panicking handler still answers with the error envelope.
fn panic_response(_: Box<dyn std::any::Any + Send + 'static>) -> Response {
    AppError::from(anyhow::anyhow!("request handler panicked")).into_response()
}
