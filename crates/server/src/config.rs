use std::env;

use sgf_core::selector::MAX_BOARD_SIZE;
use sgf_core::text::DEFAULT_MAX_BYTES;
use sgf_core::Limits;

/// Headroom for JSON framing and escapes on top of the SGF size ceiling.
const BODY_OVERHEAD: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Ceiling for `sgfContent`, in bytes.
    pub max_bytes: usize,
    pub max_board_size: u32,
}

impl Config {
    pub fn from_env() -> Self {
        let requested_board = env::var("SGF_MAX_BOARD_SIZE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(MAX_BOARD_SIZE);
        let max_board_size = requested_board.clamp(1, MAX_BOARD_SIZE);
        if max_board_size != requested_board {
            tracing::warn!(
                requested = requested_board,
                using = max_board_size,
                "SGF_MAX_BOARD_SIZE out of range, clamped"
            );
        }

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            max_bytes: env::var("SGF_MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BYTES),
            max_board_size,
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_bytes: self.max_bytes,
            max_board_size: self.max_board_size,
        }
    }

    /// Request body ceiling. Escaping can double the encoded size of the content.
    pub fn body_limit(&self) -> usize {
        self.max_bytes.saturating_mul(2).saturating_add(BODY_OVERHEAD)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_bytes: DEFAULT_MAX_BYTES,
            max_board_size: MAX_BOARD_SIZE,
        }
    }
}
