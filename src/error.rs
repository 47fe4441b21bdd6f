//! Error types.
//!
//! - `SignalError`: typed failures crossing the core engine boundary.
//! - `AppError`: what the binary reports, carrying a process exit code.
//!
//! Exit codes: 2 = usage/config/IO, 3 = insufficient data, 4 = upstream failure.

use thiserror::Error;

/// Failures that abort a whole engine run.
///
/// Degraded inputs (one missing series) are not errors; they surface as
/// warnings on a partial result instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("insufficient history: {available} grid points available, {required} required")]
    InsufficientHistory { available: usize, required: usize },

    #[error("anchor series `{id}` is missing or empty")]
    MissingAnchor { id: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

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

    pub fn exit_code(&self) -> u8 {
        self.exit_code
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

impl From<SignalError> for AppError {
    fn from(err: SignalError) -> Self {
        let code = match err {
            SignalError::InsufficientHistory { .. } | SignalError::MissingAnchor { .. } => 3,
            SignalError::InvalidConfig(_) => 2,
        };
        AppError::new(code, err.to_string())
    }
}
