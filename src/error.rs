//! Request-scoped failures and their mapping to HTTP responses.
//!
//! Handlers return [`ApiResult`]; every variant renders the standard
//! envelope. Internal failures are logged in full here and reach the
//! client only as an opaque message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::{auth::error::AuthError, response::Envelope};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input (400).
    #[error("{0}")]
    Validation(String),

    /// Bearer credential rejected (401).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Caller does not own the resource (403).
    #[error("{0}")]
    Forbidden(String),

    /// Resource or route does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// Storage or configuration failure (500).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("database error"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(err) => {
                error!(error = ?err, "internal error");
                "Internal server error".to_string()
            }
            ApiError::Auth(err) => {
                warn!(kind = err.kind(), "authentication rejected");
                err.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(Envelope::failure(message))).into_response()
    }
}
