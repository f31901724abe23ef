//! Domain error types for the statx server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use crate::validation::Field;

/// A raw input value that failed field validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}field '{}': {}", row_prefix(.row), .field, .message)]
pub struct ValidationError {
    /// Field the value was destined for.
    pub field: Field,
    /// Human-readable reason.
    pub message: String,
    /// Position of the offending row in an import source (0-based).
    pub row: Option<usize>,
}

impl ValidationError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            row: None,
        }
    }

    /// Tag the error with the position of the row it came from.
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

fn row_prefix(row: &Option<usize>) -> String {
    row.map(|row| format!("row {}: ", row)).unwrap_or_default()
}

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Raw input failed a field validator
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Request could not be decoded
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Import column mapping is malformed or out of range
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Persistence engine failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::Configuration(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, response_message) = match self {
            AppError::Validation(_) | AppError::InvalidInput(_) => {
                ("INVALID_INPUT", self.to_string())
            }
            AppError::Configuration(_) => ("CONFIGURATION_ERROR", self.to_string()),
            AppError::Storage(err_str) => {
                tracing::error!("Storage error: {}", err_str);
                (
                    "STORAGE_ERROR",
                    "An internal storage error occurred".to_string(),
                )
            }
            AppError::NotFound(_) => ("NOT_FOUND", self.to_string()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Storage(err.to_string())
    }
}
