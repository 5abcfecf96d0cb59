//! Error types for the REST API.
//!
//! [`ApiError`] converts service failures into JSON responses of the form
//! `{ "error": <message>, "status": <code> }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use betty_core::{ServiceError, StoreError};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// The request conflicts with the user's progress.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidUuid(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Store(store) => Self::from(store),
            locked @ ServiceError::QuestLocked { .. } => Self::Conflict(locked.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Backend { .. } => {
                tracing::error!(error = %err, "Store failure while serving request");
                Self::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::NotFound(msg)
            | Self::InvalidUuid(msg)
            | Self::Conflict(msg)
            | Self::Internal(msg) => msg,
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
