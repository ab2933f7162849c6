use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde_json::Value as JsonValue;
use sgf_core::{DiagramOutput, DiagramRenderer, InfoOutput};

use crate::config::Config;
use crate::error::AppError;

/// POST /api/sgf/info
/// Game info, move count and board size for an SGF record.
pub async fn info(
    Extension(config): Extension<Config>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<InfoOutput>, AppError> {
    let Json(args) = payload.map_err(|r| AppError::from_rejection(r, config.body_limit()))?;
    let output = sgf_core::info(args, &config.limits())?;
    Ok(Json(output))
}

/// POST /api/sgf/diagram
/// Board image for a move, a move range or the final position.
pub async fn diagram(
    Extension(config): Extension<Config>,
    Extension(renderer): Extension<Arc<dyn DiagramRenderer>>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<DiagramOutput>, AppError> {
    let Json(args) = payload.map_err(|r| AppError::from_rejection(r, config.body_limit()))?;
    let output = sgf_core::diagram(args, &config.limits(), renderer.as_ref()).await?;
    Ok(Json(output))
}
