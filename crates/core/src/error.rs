//! Error types for pixelboard-core

use thiserror::Error;

/// Board construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Board dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: usize, height: usize },

    #[error("Color index {index} is outside the palette (size {size})")]
    InvalidColor { index: usize, size: usize },

    #[error("Board dimensions {width}x{height} are too large")]
    TooLarge { width: usize, height: usize },
}

/// Reasons a paint submission is rejected
///
/// Everything except `PipelineClosed` is reported back to the submitter
/// as-is. None of them are retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaintError {
    #[error("Missing identity token")]
    MissingToken,

    #[error("Token {token} is cooling down")]
    Cooling { token: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Paint pipeline is not running")]
    PipelineClosed,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BoardError>;
