//! Error kinds and the request-level error type.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::parser::ParseError;
use crate::render::RenderError;
use crate::selector::{SelectorError, MAX_BOARD_SIZE};

/// Caller-facing error taxonomy. Every failed request reports exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidFormat,
    InvalidParameters,
    ParsingError,
    UnsupportedGame,
    FileTooLarge,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidFormat => "INVALID_FORMAT",
            ErrorKind::InvalidParameters => "INVALID_PARAMETERS",
            ErrorKind::ParsingError => "PARSING_ERROR",
            ErrorKind::UnsupportedGame => "UNSUPPORTED_GAME",
            ErrorKind::FileTooLarge => "FILE_TOO_LARGE",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SgfError {
    #[error("SGF content is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Invalid SGF format: {0}")]
    InvalidFormat(String),

    #[error("{message}")]
    InvalidArguments {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("Failed to parse SGF: {0}")]
    Parse(#[from] ParseError),

    #[error("Unsupported game type GM[{0}]: only Go (GM[1]) is supported")]
    UnsupportedGame(i64),

    #[error("Board size {0} is outside the supported range 1-{max}", max = MAX_BOARD_SIZE)]
    BoardSize(i64),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SgfError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SgfError::TooLarge { .. } => ErrorKind::FileTooLarge,
            SgfError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            SgfError::InvalidArguments { .. } => ErrorKind::InvalidParameters,
            SgfError::Parse(_) => ErrorKind::ParsingError,
            SgfError::UnsupportedGame(_) => ErrorKind::UnsupportedGame,
            SgfError::BoardSize(_) => ErrorKind::InvalidParameters,
            SgfError::Selector(_) => ErrorKind::InvalidParameters,
            SgfError::Render(_) | SgfError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Machine-readable context for the failure, if there is any.
    pub fn details(&self) -> Option<JsonValue> {
        match self {
            SgfError::TooLarge { size, limit } => Some(json!({ "size": size, "limit": limit })),
            SgfError::InvalidArguments { details, .. } => details.clone(),
            SgfError::Parse(e) => Some(json!({ "line": e.line, "column": e.column })),
            SgfError::UnsupportedGame(code) => Some(json!({ "gameType": code })),
            SgfError::BoardSize(size) => {
                Some(json!({ "boardSize": size, "min": 1, "max": MAX_BOARD_SIZE }))
            }
            SgfError::Selector(e) => e.details(),
            _ => None,
        }
    }
}

/// Failure body returned by both operations.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl From<&SgfError> for ErrorEnvelope {
    fn from(err: &SgfError) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
                details: err.details(),
            },
        }
    }
}
