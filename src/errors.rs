//! # Application Error Types
//!
//! This module defines common error types used throughout the invoice-mapper
//! pipeline. It provides structured error handling for validation, external
//! collaborator failures, and configuration problems.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Validation errors (pack configs, quantities, new-item specs)
    Validation(String),
    /// External collaborator errors (catalog search, pack history, web search)
    Collaborator(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Collaborator(msg) => write!(f, "[COLLABORATOR] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting
pub mod error_logging {
    use tracing::error;

    /// Log external collaborator errors with source context
    pub fn log_collaborator_error(
        error: &impl std::fmt::Display,
        source: &str,
        operation: &str,
    ) {
        error!(
            error = %error,
            source = %source,
            operation = %operation,
            "Collaborator call failed"
        );
    }

    /// Log validation errors with field context
    pub fn log_validation_error(
        error: &impl std::fmt::Display,
        operation: &str,
        field: &str,
        value: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            field = %field,
            value = ?value,
            "Validation failed"
        );
    }
}
