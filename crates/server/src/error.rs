use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sgf_core::{ErrorEnvelope, ErrorKind, SgfError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Sgf(#[from] SgfError),

    #[error("Request body exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize },

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Map a rejected JSON body into the error envelope's terms.
    pub fn from_rejection(rejection: JsonRejection, limit: usize) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::BodyTooLarge { limit };
        }
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }

    fn envelope(&self) -> ErrorEnvelope {
        match self {
            AppError::Sgf(e) => ErrorEnvelope::from(e),
            AppError::BodyTooLarge { limit } => {
                envelope(ErrorKind::FileTooLarge, self.to_string(), Some(json!({ "limit": limit })))
            }
            AppError::BadRequest(msg) => envelope(ErrorKind::InvalidParameters, msg.clone(), None),
            AppError::Anyhow(_) => envelope(
                ErrorKind::InternalError,
                "Internal server error".to_string(),
                None,
            ),
        }
    }
}

fn envelope(kind: ErrorKind, message: String, details: Option<serde_json::Value>) -> ErrorEnvelope {
    ErrorEnvelope {
        success: false,
        error: sgf_core::error::ErrorBody {
            kind,
            message,
            details,
        },
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidFormat | ErrorKind::InvalidParameters => StatusCode::BAD_REQUEST,
        ErrorKind::ParsingError | ErrorKind::UnsupportedGame => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = self.envelope();
        match &self {
            AppError::Anyhow(e) => tracing::error!("Unexpected error: {e}"),
            AppError::Sgf(e) if e.kind() == ErrorKind::InternalError => {
                tracing::error!("Internal error: {e}")
            }
            other => tracing::debug!(kind = %body.error.kind, "request rejected: {other}"),
        }

        (status_for(body.error.kind), Json(body)).into_response()
    }
}
