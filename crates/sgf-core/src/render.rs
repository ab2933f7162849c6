//! The renderer capability the diagram operation depends on.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::selector::{ImageFormat, ResolvedRenderInstruction, Theme};

/// Parameters handed to a renderer, already in its own (0-based) move indexing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Last move to show; `None` shows the final position.
    pub move_index: Option<usize>,
    pub width: u32,
    pub height: u32,
    pub coord_labels: bool,
    pub move_numbers: bool,
    pub theme: Theme,
    pub format: ImageFormat,
}

impl From<&ResolvedRenderInstruction> for RenderRequest {
    fn from(instruction: &ResolvedRenderInstruction) -> Self {
        Self {
            move_index: instruction.renderer_move_index(),
            width: instruction.width,
            height: instruction.height,
            coord_labels: instruction.coord_labels,
            move_numbers: instruction.move_numbers,
            theme: instruction.theme,
            format: instruction.format,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Renderer failed: {0}")]
pub struct RenderError(pub String);

/// Draws a board image for already-validated SGF text.
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Returns the encoded image bytes in `request.format`.
    async fn render(&self, sgf: &str, request: &RenderRequest) -> Result<Vec<u8>, RenderError>;
}
