// src/utils/errors.rs

use std::{error::Error, fmt};

use thiserror::Error as ThisError;

/// Errors coming from external quote-source calls (HTTP, JSON, timeouts).
#[derive(Debug)]
pub enum ApiError {
    Http(reqwest::Error),
    Json(serde_json::Error),
    Timeout(&'static str),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http(e)      => write!(f, "HTTP error: {}", e),
            ApiError::Json(e)      => write!(f, "JSON error: {}", e),
            ApiError::Timeout(src) => write!(f, "quote source '{}' timed out", src),
            ApiError::Other(msg)   => write!(f, "{}", msg),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Http(e)    => Some(e),
            ApiError::Json(e)    => Some(e),
            ApiError::Timeout(_) => None,
            ApiError::Other(_)   => None,
        }
    }
}

// Conversions from underlying errors into ApiError
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self { ApiError::Http(err) }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self { ApiError::Json(err) }
}

/// Validation failures at the engine boundary. Short windows are NOT errors
/// (indicators degrade); only malformed input is refused.
#[derive(Debug, ThisError)]
pub enum EngineError {
    #[error("candle window is empty")]
    EmptyWindow,
    #[error("candle timestamps must be strictly increasing (violation at index {0})")]
    NonMonotonicTimestamps(usize),
    #[error("candle at index {0} has a non-positive price field")]
    NonPositivePrice(usize),
    #[error("snapshot price must be positive, got {0}")]
    InvalidSnapshotPrice(f64),
    #[error("at least one forecast horizon is required")]
    NoHorizons,
}
