//! Error handling for the pass.in HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Standard error response format for all HTTP errors.
/// `code` always equals the HTTP status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    pub code: u16,
    pub cause: Option<Vec<serde_json::Value>>,
    pub trace_id: String,
}

/// Application error kinds that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        message: String,
    },

    /// Slug, registration or check-in already exists.
    #[error("duplicate: {message}")]
    Duplicate { message: String },

    #[error("capacity exceeded: {message}")]
    CapacityExceeded { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            message: message.into(),
        }
    }

    /// Create a duplicate error
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            message: message.into(),
        }
    }

    /// Create a capacity exceeded error
    pub fn capacity_exceeded(message: impl Into<String>) -> Self {
        Self::CapacityExceeded {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Wrap an unexpected error
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. }
            | AppError::Duplicate { .. }
            | AppError::CapacityExceeded { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation",
            AppError::Duplicate { .. } => "duplicate",
            AppError::CapacityExceeded { .. } => "capacity_exceeded",
            AppError::NotFound { .. } => "not_found",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();
        let kind = self.kind();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_kind = kind,
                status_code = %status.as_u16(),
                error = ?self,
                "Request failed"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                error_kind = kind,
                status_code = %status.as_u16(),
                "Request rejected: {}",
                self
            );
        }

        let (message, cause) = match self {
            AppError::Validation { details, message } => (message, Some(details)),
            AppError::Duplicate { message }
            | AppError::CapacityExceeded { message }
            | AppError::NotFound { message } => (message, None),
            // Internal details stay in the logs for release builds
            AppError::Internal(e) if cfg!(debug_assertions) => (e.to_string(), None),
            AppError::Internal(_) => ("An internal server error occurred".to_string(), None),
        };

        let body = ErrorBody {
            message,
            code: status.as_u16(),
            cause,
            trace_id: error_id.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
