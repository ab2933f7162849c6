//! Move selection and image options for diagram requests.
//!
//! Move numbers are 1-based throughout: move `n` is the position after the n-th
//! move, and the valid window is `1..=total_moves`. The renderer counts from zero;
//! [`to_renderer_index`] is the single place that converts.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

/// Largest board the renderer supports.
pub const MAX_BOARD_SIZE: u32 = 361;

pub const MIN_DIMENSION: i64 = 100;
pub const MAX_DIMENSION: i64 = 2000;
pub const DEFAULT_DIMENSION: u32 = 600;

const FIRST_MOVE: i64 = 1;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Classic,
    Modern,
    Minimal,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Selection and options exactly as the caller sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorInput {
    pub move_number: Option<i64>,
    pub start_move: Option<i64>,
    pub end_move: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub coord_labels: Option<bool>,
    pub move_numbers: Option<bool>,
    pub theme: Option<Theme>,
    pub format: Option<ImageFormat>,
}

/// Which part of the game to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Selection {
    FullGame,
    Move { number: usize },
    Range { start: usize, end: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectorError {
    #[error("Board size {size} exceeds the maximum supported size of {max}")]
    BoardTooLarge { size: u32, max: u32 },

    #[error("moveNumber cannot be combined with startMove/endMove")]
    ConflictingSelectors,

    #[error("startMove and endMove must be provided together ({missing} is missing)")]
    IncompleteRange { missing: &'static str },

    #[error("startMove ({start}) must not be greater than endMove ({end})")]
    ReversedRange { start: i64, end: i64 },

    #[error("{field} must be at least 1 (got {value})")]
    MoveBelowRange { field: &'static str, value: i64 },

    #[error("{field} {value} is out of range: the game has {max} moves, valid range is 1-{max}")]
    MoveAboveRange {
        field: &'static str,
        value: i64,
        max: usize,
    },

    #[error("{field} {value} cannot be used: the game has no moves")]
    NoMoves { field: &'static str, value: i64 },

    #[error(
        "{field} must be between {min} and {max} pixels (got {value})",
        min = MIN_DIMENSION,
        max = MAX_DIMENSION
    )]
    DimensionOutOfRange { field: &'static str, value: i64 },
}

impl SelectorError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SelectorError::IncompleteRange { missing } => Some(*missing),
            SelectorError::MoveBelowRange { field, .. }
            | SelectorError::MoveAboveRange { field, .. }
            | SelectorError::NoMoves { field, .. }
            | SelectorError::DimensionOutOfRange { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<JsonValue> {
        let details = match self {
            SelectorError::BoardTooLarge { size, max } => json!({ "boardSize": size, "max": max }),
            SelectorError::ConflictingSelectors => {
                json!({ "fields": ["moveNumber", "startMove", "endMove"] })
            }
            SelectorError::IncompleteRange { missing } => json!({ "field": missing }),
            SelectorError::ReversedRange { start, end } => {
                json!({ "startMove": start, "endMove": end })
            }
            SelectorError::MoveBelowRange { field, value } => {
                json!({ "field": field, "value": value, "min": FIRST_MOVE })
            }
            SelectorError::MoveAboveRange { field, value, max } => {
                json!({ "field": field, "value": value, "min": FIRST_MOVE, "max": max })
            }
            SelectorError::NoMoves { field, value } => {
                json!({ "field": field, "value": value, "max": 0 })
            }
            SelectorError::DimensionOutOfRange { field, value } => json!({
                "field": field,
                "value": value,
                "min": MIN_DIMENSION,
                "max": MAX_DIMENSION,
            }),
        };
        Some(details)
    }
}

/// Fully validated, defaulted parameters for one diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRenderInstruction {
    pub selection: Selection,
    pub width: u32,
    pub height: u32,
    pub coord_labels: bool,
    pub move_numbers: bool,
    pub theme: Theme,
    pub format: ImageFormat,
    pub moves_covered: usize,
    pub board_size: u32,
}

impl ResolvedRenderInstruction {
    /// Zero-based index of the last move to show, `None` for the final position.
    pub fn renderer_move_index(&self) -> Option<usize> {
        match self.selection {
            Selection::FullGame => None,
            Selection::Move { number } => Some(to_renderer_index(number)),
            Selection::Range { end, .. } => Some(to_renderer_index(end)),
        }
    }
}

/// Convert a 1-based move number to the renderer's 0-based index.
pub fn to_renderer_index(move_number: usize) -> usize {
    move_number.saturating_sub(1)
}

/// Selection before the move window is known.
enum Requested {
    FullGame,
    Move(i64),
    Range(i64, i64),
}

/// Rules that need nothing but the request: mutual exclusion, range completeness,
/// range order, the lower move bound and image dimensions.
///
/// The argument layer runs this before any parsing; [`resolve`] runs the same
/// checks, so a given violation always produces the same message.
pub fn check_request(input: &SelectorInput) -> Result<(), SelectorError> {
    check_selection(input)?;
    check_dimensions(input)
}

/// Validate a selection against the game and fill in defaults.
///
/// Rules apply in a fixed order: board ceiling, mutual exclusion, range
/// completeness, range order, move window, dimensions.
pub fn resolve(
    input: &SelectorInput,
    total_moves: usize,
    board_size: u32,
    max_board_size: u32,
) -> Result<ResolvedRenderInstruction, SelectorError> {
    let ceiling = max_board_size.min(MAX_BOARD_SIZE);
    if board_size > ceiling {
        return Err(SelectorError::BoardTooLarge {
            size: board_size,
            max: ceiling,
        });
    }

    let selection = match check_selection(input)? {
        Requested::FullGame => Selection::FullGame,
        Requested::Move(n) => Selection::Move {
            number: within_window("moveNumber", n, total_moves)?,
        },
        Requested::Range(start, end) => Selection::Range {
            start: within_window("startMove", start, total_moves)?,
            end: within_window("endMove", end, total_moves)?,
        },
    };

    check_dimensions(input)?;

    let moves_covered = match selection {
        Selection::FullGame => total_moves,
        Selection::Move { number } => number,
        Selection::Range { start, end } => end - start + 1,
    };

    Ok(ResolvedRenderInstruction {
        selection,
        width: input.width.map_or(DEFAULT_DIMENSION, |w| w as u32),
        height: input.height.map_or(DEFAULT_DIMENSION, |h| h as u32),
        coord_labels: input.coord_labels.unwrap_or(true),
        move_numbers: input.move_numbers.unwrap_or(true),
        theme: input.theme.unwrap_or_default(),
        format: input.format.unwrap_or_default(),
        moves_covered,
        board_size,
    })
}

fn check_selection(input: &SelectorInput) -> Result<Requested, SelectorError> {
    match (input.move_number, input.start_move, input.end_move) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(SelectorError::ConflictingSelectors),
        (None, Some(_), None) => Err(SelectorError::IncompleteRange { missing: "endMove" }),
        (None, None, Some(_)) => Err(SelectorError::IncompleteRange {
            missing: "startMove",
        }),
        (None, Some(start), Some(end)) => {
            if start > end {
                return Err(SelectorError::ReversedRange { start, end });
            }
            at_least_first("startMove", start)?;
            at_least_first("endMove", end)?;
            Ok(Requested::Range(start, end))
        }
        (Some(n), None, None) => {
            at_least_first("moveNumber", n)?;
            Ok(Requested::Move(n))
        }
        (None, None, None) => Ok(Requested::FullGame),
    }
}

fn at_least_first(field: &'static str, value: i64) -> Result<(), SelectorError> {
    if value < FIRST_MOVE {
        return Err(SelectorError::MoveBelowRange { field, value });
    }
    Ok(())
}

fn within_window(field: &'static str, value: i64, total_moves: usize) -> Result<usize, SelectorError> {
    if total_moves == 0 {
        return Err(SelectorError::NoMoves { field, value });
    }
    match usize::try_from(value) {
        Ok(n) if n <= total_moves => Ok(n),
        _ => Err(SelectorError::MoveAboveRange {
            field,
            value,
            max: total_moves,
        }),
    }
}

fn check_dimensions(input: &SelectorInput) -> Result<(), SelectorError> {
    for (field, value) in [("width", input.width), ("height", input.height)] {
        if let Some(value) = value {
            if value < MIN_DIMENSION || value > MAX_DIMENSION {
                return Err(SelectorError::DimensionOutOfRange { field, value });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(n: i64) -> SelectorInput {
        SelectorInput {
            move_number: Some(n),
            ..Default::default()
        }
    }

    fn range(start: i64, end: i64) -> SelectorInput {
        SelectorInput {
            start_move: Some(start),
            end_move: Some(end),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_for_full_game() {
        let resolved = resolve(&SelectorInput::default(), 42, 19, MAX_BOARD_SIZE).unwrap();
        assert_eq!(resolved.selection, Selection::FullGame);
        assert_eq!((resolved.width, resolved.height), (600, 600));
        assert!(resolved.coord_labels);
        assert!(resolved.move_numbers);
        assert_eq!(resolved.theme, Theme::Classic);
        assert_eq!(resolved.format, ImageFormat::Png);
        assert_eq!(resolved.moves_covered, 42);
        assert_eq!(resolved.renderer_move_index(), None);
    }

    #[test]
    fn test_single_move() {
        let resolved = resolve(&single(5), 10, 19, MAX_BOARD_SIZE).unwrap();
        assert_eq!(resolved.moves_covered, 5);
        assert_eq!(resolved.renderer_move_index(), Some(4));

        let last = resolve(&single(10), 10, 19, MAX_BOARD_SIZE).unwrap();
        assert_eq!(last.moves_covered, 10);
    }

    #[test]
    fn test_range() {
        let resolved = resolve(&range(3, 7), 10, 19, MAX_BOARD_SIZE).unwrap();
        assert_eq!(resolved.selection, Selection::Range { start: 3, end: 7 });
        assert_eq!(resolved.moves_covered, 5);
        assert_eq!(resolved.renderer_move_index(), Some(6));

        let one = resolve(&range(4, 4), 10, 19, MAX_BOARD_SIZE).unwrap();
        assert_eq!(one.moves_covered, 1);
    }

    #[test]
    fn test_move_beyond_total_names_range() {
        let err = resolve(&single(3), 2, 19, MAX_BOARD_SIZE).unwrap_err();
        assert_eq!(
            err,
            SelectorError::MoveAboveRange {
                field: "moveNumber",
                value: 3,
                max: 2
            }
        );
        assert!(err.to_string().contains("valid range is 1-2"));
    }

    #[test]
    fn test_lower_bound() {
        let err = resolve(&single(0), 10, 19, MAX_BOARD_SIZE).unwrap_err();
        assert!(matches!(err, SelectorError::MoveBelowRange { value: 0, .. }));
        let err = resolve(&range(-1, 3), 10, 19, MAX_BOARD_SIZE).unwrap_err();
        assert!(matches!(err, SelectorError::MoveBelowRange { field: "startMove", .. }));
    }

    #[test]
    fn test_no_moves() {
        let err = resolve(&single(1), 0, 19, MAX_BOARD_SIZE).unwrap_err();
        assert!(matches!(err, SelectorError::NoMoves { .. }));
        assert!(resolve(&SelectorInput::default(), 0, 19, MAX_BOARD_SIZE).is_ok());
    }

    #[test]
    fn test_mutual_exclusion_wins_over_other_rules() {
        let input = SelectorInput {
            move_number: Some(1),
            start_move: Some(1),
            end_move: Some(2),
            ..Default::default()
        };
        assert_eq!(
            resolve(&input, 10, 19, MAX_BOARD_SIZE),
            Err(SelectorError::ConflictingSelectors)
        );

        let partial = SelectorInput {
            move_number: Some(1),
            end_move: Some(2),
            ..Default::default()
        };
        assert_eq!(check_request(&partial), Err(SelectorError::ConflictingSelectors));
    }

    #[test]
    fn test_incomplete_and_reversed_ranges() {
        let start_only = SelectorInput {
            start_move: Some(2),
            ..Default::default()
        };
        assert_eq!(
            check_request(&start_only),
            Err(SelectorError::IncompleteRange { missing: "endMove" })
        );
        assert_eq!(
            resolve(&range(5, 2), 10, 19, MAX_BOARD_SIZE),
            Err(SelectorError::ReversedRange { start: 5, end: 2 })
        );
    }

    #[test]
    fn test_dimension_bounds() {
        let mut input = SelectorInput {
            width: Some(100),
            height: Some(2000),
            ..Default::default()
        };
        let ok = resolve(&input, 1, 19, MAX_BOARD_SIZE).unwrap();
        assert_eq!((ok.width, ok.height), (100, 2000));

        input.width = Some(99);
        assert!(matches!(
            resolve(&input, 1, 19, MAX_BOARD_SIZE),
            Err(SelectorError::DimensionOutOfRange { field: "width", value: 99 })
        ));

        input.width = None;
        input.height = Some(2001);
        let err = check_request(&input).unwrap_err();
        assert_eq!(err.field(), Some("height"));
    }

    #[test]
    fn test_board_ceiling() {
        assert!(resolve(&SelectorInput::default(), 1, 361, MAX_BOARD_SIZE).is_ok());
        assert_eq!(
            resolve(&SelectorInput::default(), 1, 362, MAX_BOARD_SIZE),
            Err(SelectorError::BoardTooLarge { size: 362, max: 361 })
        );
        // A configured ceiling never lifts the renderer limit.
        assert!(resolve(&SelectorInput::default(), 1, 362, 1000).is_err());
        assert!(matches!(
            resolve(&SelectorInput::default(), 1, 25, 19),
            Err(SelectorError::BoardTooLarge { max: 19, .. })
        ));
    }

    #[test]
    fn test_board_ceiling_checked_first() {
        let input = SelectorInput {
            move_number: Some(1),
            start_move: Some(1),
            end_move: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            resolve(&input, 1, 400, MAX_BOARD_SIZE),
            Err(SelectorError::BoardTooLarge { .. })
        ));
    }

    #[test]
    fn test_request_checks_match_resolver_messages() {
        let cases = [
            single(0),
            range(4, 1),
            SelectorInput {
                end_move: Some(3),
                ..Default::default()
            },
            SelectorInput {
                width: Some(50),
                ..Default::default()
            },
        ];
        for input in cases {
            let early = check_request(&input).unwrap_err();
            let late = resolve(&input, 10, 19, MAX_BOARD_SIZE).unwrap_err();
            assert_eq!(early.to_string(), late.to_string());
        }
    }

    #[test]
    fn test_enum_names_and_mime_types() {
        assert_eq!(Theme::Modern.as_ref(), "modern");
        assert_eq!("minimal".parse::<Theme>(), Ok(Theme::Minimal));
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
        let parsed: ImageFormat = serde_json::from_value(json!("jpeg")).unwrap();
        assert_eq!(parsed, ImageFormat::Jpeg);
    }

    #[test]
    fn test_instruction_serializes() {
        let resolved = resolve(&range(1, 2), 2, 9, MAX_BOARD_SIZE).unwrap();
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["selection"]["kind"], "range");
        assert_eq!(json["selection"]["end"], 2);
        assert_eq!(json["movesCovered"], 2);
        assert_eq!(json["theme"], "classic");
        assert_eq!(json["coordLabels"], true);
    }
}
