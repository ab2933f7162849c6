//! The `info` and `diagram` operations.
//!
//! Each call builds its own tree and discards it; nothing is cached between
//! requests.

use base64::Engine;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, error};

use crate::args::{parse_args, DiagramArgs, InfoArgs};
use crate::error::SgfError;
use crate::metadata::{extract_metadata, Extraction, GameMetadata};
use crate::moves::count_moves;
use crate::parser::parse;
use crate::render::{DiagramRenderer, RenderRequest};
use crate::selector::{resolve, ResolvedRenderInstruction, MAX_BOARD_SIZE};
use crate::text::{check_text, DEFAULT_MAX_BYTES};
use crate::tree::GameTree;

/// Per-deployment ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_bytes: usize,
    /// Board size ceiling for diagrams; never above [`MAX_BOARD_SIZE`].
    pub max_board_size: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_board_size: MAX_BOARD_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoOutput {
    pub game_info: GameMetadata,
    pub metadata: GameSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub total_moves: usize,
    pub board_size: u32,
    pub has_valid_structure: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramOutput {
    /// Base64-encoded image bytes.
    pub data: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub moves_covered: usize,
    pub board_size: u32,
    pub parameters: ResolvedRenderInstruction,
}

/// A validated, parsed game with the values both operations need.
#[derive(Debug)]
pub struct LoadedGame {
    pub tree: GameTree,
    pub extraction: Extraction,
    pub total_moves: usize,
}

/// Text check, parse, metadata extraction and move count, in that order.
pub fn load_game(sgf: &str, limits: &Limits) -> Result<LoadedGame, SgfError> {
    check_text(sgf, limits.max_bytes)?;
    let tree = parse(sgf)?;
    let extraction = extract_metadata(&tree)?;
    let total_moves = count_moves(&tree);
    Ok(LoadedGame {
        tree,
        extraction,
        total_moves,
    })
}

pub fn info(args: JsonValue, limits: &Limits) -> Result<InfoOutput, SgfError> {
    let args: InfoArgs = parse_args(args)?;
    let game = load_game(&args.sgf_content, limits)?;

    debug!(
        total_moves = game.total_moves,
        board_size = game.extraction.board_size,
        nodes = game.tree.node_count(),
        warnings = game.extraction.warnings.len(),
        "info extracted"
    );

    Ok(InfoOutput {
        game_info: game.extraction.metadata,
        metadata: GameSummary {
            total_moves: game.total_moves,
            board_size: game.extraction.board_size,
            has_valid_structure: true,
        },
        warnings: game.extraction.warnings,
    })
}

pub async fn diagram(
    args: JsonValue,
    limits: &Limits,
    renderer: &dyn DiagramRenderer,
) -> Result<DiagramOutput, SgfError> {
    let args: DiagramArgs = parse_args(args)?;
    let game = load_game(&args.sgf_content, limits)?;
    for warning in &game.extraction.warnings {
        debug!(%warning, "metadata warning");
    }

    let instruction = resolve(
        &args.selector(),
        game.total_moves,
        game.extraction.board_size,
        limits.max_board_size,
    )?;
    drop(game);

    let request = RenderRequest::from(&instruction);
    let bytes = renderer
        .render(&args.sgf_content, &request)
        .await
        .map_err(|e| {
            error!(error = %e, "diagram render failed");
            e
        })?;

    debug!(
        bytes = bytes.len(),
        moves_covered = instruction.moves_covered,
        format = %instruction.format,
        "diagram rendered"
    );

    Ok(DiagramOutput {
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        mime_type: instruction.format.mime_type(),
        width: instruction.width,
        height: instruction.height,
        moves_covered: instruction.moves_covered,
        board_size: instruction.board_size,
        parameters: instruction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::render::RenderError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records what it was asked to draw and returns fixed bytes.
    #[derive(Default)]
    struct RecordingRenderer {
        seen: Mutex<Vec<RenderRequest>>,
    }

    #[async_trait]
    impl DiagramRenderer for RecordingRenderer {
        async fn render(&self, _sgf: &str, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(vec![1, 2, 3])
        }
    }

    struct FailingRenderer;

    #[async_trait]
    impl DiagramRenderer for FailingRenderer {
        async fn render(&self, _sgf: &str, _request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
            Err(RenderError("out of ink".into()))
        }
    }

    #[test]
    fn test_info_literal_examples() {
        let limits = Limits::default();

        let out = info(json!({ "sgfContent": "(;FF[4]GM[1]SZ[19];B[dd];W[pd])" }), &limits).unwrap();
        assert_eq!(out.metadata.board_size, 19);
        assert_eq!(out.metadata.total_moves, 2);
        assert!(out.metadata.has_valid_structure);

        let out = info(
            json!({ "sgfContent": "(;FF[4]GM[1]SZ[19]HA[4]AB[dd][pd][dp][pp];W[qf])" }),
            &limits,
        )
        .unwrap();
        assert_eq!(out.metadata.total_moves, 1);
        assert_eq!(out.game_info.handicap, Some(4));

        let out = info(
            json!({ "sgfContent": "(;FF[4]GM[1]SZ[19];B[dd](;W[pd])(;W[dp]))" }),
            &limits,
        )
        .unwrap();
        assert_eq!(out.metadata.total_moves, 3);

        let out = info(
            json!({ "sgfContent": r"(;FF[4]GM[1]SZ[19]GN[Test: Game \] with [special\] chars];B[aa])" }),
            &limits,
        )
        .unwrap();
        assert_eq!(
            out.game_info.game_name.as_deref(),
            Some("Test: Game ] with [special] chars")
        );
    }

    #[test]
    fn test_info_output_shape() {
        let out = info(json!({ "sgfContent": "(;GM[1]PB[B];B[aa])" }), &Limits::default()).unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["gameInfo"]["blackPlayer"], "B");
        assert_eq!(json["metadata"]["totalMoves"], 1);
        assert_eq!(json["metadata"]["boardSize"], 19);
        assert_eq!(json["metadata"]["hasValidStructure"], true);
        assert!(json["warnings"][0].as_str().unwrap().contains("19x19"));
    }

    #[test]
    fn test_info_error_kinds() {
        let limits = Limits {
            max_bytes: 64,
            ..Limits::default()
        };
        let cases = [
            (json!({ "sgfContent": "(;GM[1]SZ[19];B[aa])", "x": 1 }), ErrorKind::InvalidParameters),
            (json!({ "sgfContent": "no parens" }), ErrorKind::InvalidFormat),
            (json!({ "sgfContent": "(;GM[1]C[oops\\])" }), ErrorKind::InvalidFormat),
            (json!({ "sgfContent": "(;GM[1] ;B[aa] x)" }), ErrorKind::ParsingError),
            (json!({ "sgfContent": "(;GM[2];B[aa])" }), ErrorKind::UnsupportedGame),
            (json!({ "sgfContent": "(;GM[1]SZ[362];B[aa])" }), ErrorKind::InvalidParameters),
            (json!({ "sgfContent": format!("(;GM[1]C[{}])", "x".repeat(100)) }), ErrorKind::FileTooLarge),
        ];
        for (args, expected) in cases {
            let err = info(args.clone(), &limits).unwrap_err();
            assert_eq!(err.kind(), expected, "{args}");
        }
    }

    #[tokio::test]
    async fn test_diagram_resolves_and_converts_index() {
        let renderer = RecordingRenderer::default();
        let out = diagram(
            json!({ "sgfContent": "(;GM[1]SZ[9];B[aa];W[bb];B[cc])", "moveNumber": 2 }),
            &Limits::default(),
            &renderer,
        )
        .await
        .unwrap();

        assert_eq!(out.data, "AQID");
        assert_eq!(out.mime_type, "image/png");
        assert_eq!((out.width, out.height), (600, 600));
        assert_eq!(out.moves_covered, 2);
        assert_eq!(out.board_size, 9);

        let seen = renderer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].move_index, Some(1));
    }

    #[tokio::test]
    async fn test_diagram_range_and_options() {
        let renderer = RecordingRenderer::default();
        let out = diagram(
            json!({
                "sgfContent": "(;GM[1];B[aa];W[bb];B[cc];W[dd])",
                "startMove": 2,
                "endMove": 4,
                "width": 300,
                "format": "jpeg",
                "theme": "modern",
                "coordLabels": false
            }),
            &Limits::default(),
            &renderer,
        )
        .await
        .unwrap();

        assert_eq!(out.moves_covered, 3);
        assert_eq!(out.mime_type, "image/jpeg");
        assert_eq!((out.width, out.height), (300, 600));

        let seen = renderer.seen.lock().unwrap();
        assert_eq!(seen[0].move_index, Some(3));
        assert!(!seen[0].coord_labels);
        assert!(seen[0].move_numbers);
    }

    #[tokio::test]
    async fn test_diagram_move_out_of_range() {
        let renderer = RecordingRenderer::default();
        let err = diagram(
            json!({ "sgfContent": "(;FF[4]GM[1]SZ[19];B[dd];W[pd])", "moveNumber": 3 }),
            &Limits::default(),
            &renderer,
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
        assert!(err.to_string().contains("valid range is 1-2"));
        assert!(renderer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_diagram_board_ceiling() {
        let limits = Limits {
            max_board_size: 19,
            ..Limits::default()
        };
        let err = diagram(
            json!({ "sgfContent": "(;GM[1]SZ[25];B[aa])" }),
            &limits,
            &RecordingRenderer::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
        assert!(err.to_string().contains("maximum supported size of 19"));
    }

    #[tokio::test]
    async fn test_renderer_failure_is_internal() {
        let err = diagram(
            json!({ "sgfContent": "(;GM[1];B[aa])" }),
            &Limits::default(),
            &FailingRenderer,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalError);
        assert!(err.to_string().contains("out of ink"));
    }

    #[test]
    fn test_concurrent_requests_are_independent() {
        let limits = Limits::default();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (1..=32usize)
                .map(|n| {
                    let limits = &limits;
                    scope.spawn(move || {
                        let moves: String = (0..n)
                            .map(|i| if i % 2 == 0 { ";B[aa]" } else { ";W[bb]" })
                            .collect();
                        let sgf = format!("(;GM[1]SZ[19]PB[player{n}]{moves})");
                        let out = info(json!({ "sgfContent": sgf }), limits).unwrap();
                        (n, out)
                    })
                })
                .collect();

            for handle in handles {
                let (n, out) = handle.join().unwrap();
                assert_eq!(out.metadata.total_moves, n);
                assert_eq!(out.game_info.black_player, Some(format!("player{n}")));
            }
        });
    }
}
