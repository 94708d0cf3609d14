//! Error types for the GFS index services.

use thiserror::Error;

/// Result type alias using GfsError.
pub type GfsResult<T> = Result<T, GfsError>;

/// Primary error type for index and range-extraction operations.
#[derive(Debug, Error)]
pub enum GfsError {
    // === Request Errors ===
    #[error("Invalid request path: {0}")]
    InvalidPath(String),

    #[error("Invalid model run: {0}")]
    InvalidRun(String),

    // === Data Errors ===
    #[error("Malformed index line {line}: {message}")]
    MalformedIndex { line: usize, message: String },

    #[error("Variable not found: {parameter} at level '{level}'")]
    VariableNotFound { level: String, parameter: String },

    #[error("No complete run found in the last {candidates_checked} cycles")]
    RunNotResolved { candidates_checked: u32 },

    // === Infrastructure Errors ===
    #[error("Upstream request failed: {0}")]
    Transport(String),
}

impl GfsError {
    /// Get the HTTP status code for this error.
    ///
    /// Not-found outcomes (missing variable, no complete run) are kept
    /// distinct from upstream failures so callers can decide whether a
    /// retry makes sense.
    pub fn http_status_code(&self) -> u16 {
        match self {
            GfsError::InvalidPath(_) | GfsError::InvalidRun(_) => 400,

            GfsError::VariableNotFound { .. } | GfsError::RunNotResolved { .. } => 404,

            GfsError::MalformedIndex { .. } | GfsError::Transport(_) => 502,
        }
    }
}
