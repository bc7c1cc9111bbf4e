// src/api/errors.rs
//! Error type of the HTTP layer and its mapping onto responses.

use crate::core::common::WordVecError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed request parameters.
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Engine(#[from] WordVecError),
    /// The worker running the query failed (panicked or was cancelled).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Engine(err) => match err {
                WordVecError::NotFound(_) => StatusCode::NOT_FOUND,
                WordVecError::DimensionMismatch { .. }
                | WordVecError::EmptyQuery(_)
                | WordVecError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                WordVecError::DegenerateVector(_) => StatusCode::UNPROCESSABLE_ENTITY,
                WordVecError::BuildInvariantViolation(_)
                | WordVecError::Configuration(_)
                | WordVecError::Serialization(_)
                | WordVecError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(%status, error = %message, "request failed");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
