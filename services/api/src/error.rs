//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for startup
//! failures and `ServiceError` for everything a request can run into.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use event_tracker_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::config::ConfigError;

/// The primary error type for bringing the `api` service up.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying schema migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Failures of a single request, as seen by the caller.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// Login rejected. Unknown email and wrong password are indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No usable session: missing, malformed, expired or orphaned token.
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    /// A uniqueness rule was violated.
    #[error("{0}")]
    Conflict(String),

    /// Detail is logged, never sent.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_)
            | ServiceError::InvalidCredentials
            | ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message safe to show a client.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Internal(_) => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<PortError> for ServiceError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(_) => ServiceError::NotFound,
            PortError::Conflict(detail) => ServiceError::Conflict(detail),
            PortError::Unexpected(detail) => ServiceError::Internal(detail),
        }
    }
}

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let ServiceError::Internal(detail) = &self {
            error!(detail = %detail, "Request failed with an internal error");
        }
        let body = Json(ErrorResponse {
            message: self.public_message(),
        });
        (self.status(), body).into_response()
    }
}
