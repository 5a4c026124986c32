// core/src/error.rs
use thiserror::Error;

/// Felles feiltype for I/O, konfig og lagring.
///
/// Filter-avvisninger er IKKE feil – de returneres som `FixOutcome`.
#[derive(Debug, Error)]
pub enum FitTrackError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid filter config: {0}")]
    InvalidConfig(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<serde_path_to_error::Error<serde_json::Error>> for FitTrackError {
    fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
        FitTrackError::Parse {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FitTrackError>;
