//! Error types.
//!
//! Two layers:
//! - [`AppError`]: fatal, carries a process exit code back to `main`
//!   (2 = configuration/data, 3 = request failed in one-shot mode, 4 = terminal/runtime).
//! - [`PredictError`]: a single prediction attempt failed; the UI reports it and
//!   returns to idle.

use thiserror::Error;

use crate::models::ModelError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Missing/unreadable artifact or data file, missing required columns.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Recoverable failure of one prediction attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// The year/month/day triple is not a calendar date (e.g. 2024-02-30).
    #[error("Invalid date entered! {year:04}-{month:02}-{day:02} is not a calendar date.")]
    InvalidDate { year: i32, month: u32, day: u32 },
    /// Scaling or inference failed.
    #[error("Prediction error: {0}")]
    Prediction(#[from] ModelError),
    /// The trend chart could not be drawn.
    #[error("Chart error: {0}")]
    Chart(String),
}

impl From<PredictError> for AppError {
    fn from(value: PredictError) -> Self {
        AppError::new(3, value.to_string())
    }
}
