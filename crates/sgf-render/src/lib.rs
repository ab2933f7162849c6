//! Reference board renderer.
//!
//! Replays the main line of a record with captures and draws the position with
//! the `image` crate. Rendering is CPU-bound and runs on the blocking pool.

pub mod board;
pub mod draw;
pub mod encode;
pub mod font;

use async_trait::async_trait;
use sgf_core::metadata::extract_metadata;
use sgf_core::parser::parse;
use sgf_core::render::{DiagramRenderer, RenderError, RenderRequest};
use sgf_core::tree::Stone;
use tracing::debug;

use crate::draw::{draw_board, DrawOptions};

#[derive(Debug, Clone, Copy, Default)]
pub struct BoardRenderer;

impl BoardRenderer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DiagramRenderer for BoardRenderer {
    async fn render(&self, sgf: &str, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        let sgf = sgf.to_owned();
        let request = request.clone();
        tokio::task::spawn_blocking(move || render_diagram(&sgf, &request))
            .await
            .map_err(|e| RenderError(format!("render task failed: {e}")))?
    }
}

/// Parse, replay and encode in one go.
pub fn render_diagram(sgf: &str, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
    let tree = parse(sgf).map_err(|e| RenderError(e.to_string()))?;
    let size = extract_metadata(&tree)
        .map_err(|e| RenderError(e.to_string()))?
        .board_size as usize;

    let board = board::replay(&tree, size, request.move_index);
    drop(tree);
    debug!(
        size,
        moves = board.moves_played(),
        black_captures = board.captures_by(Stone::Black),
        white_captures = board.captures_by(Stone::White),
        width = request.width,
        height = request.height,
        theme = %request.theme,
        "drawing board"
    );

    let image = draw_board(
        &board,
        &DrawOptions {
            width: request.width,
            height: request.height,
            coord_labels: request.coord_labels,
            move_numbers: request.move_numbers,
            theme: request.theme,
        },
    );
    encode::encode(&image, request.format)
}
