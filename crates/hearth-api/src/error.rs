//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"error": "...", "status": 400}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hearth_core::CoreError;
use tracing::error;

/// Message returned for every failed access attempt.
pub const UNAUTHORIZED_MESSAGE: &str = "invalid household or pin";

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body or a command argument failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// Access was denied. Deliberately carries no detail.
    #[error("invalid household or pin")]
    Unauthorized,

    /// The request is understood but refused.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The command conflicted with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Conflict { stream } => Self::Conflict(format!("{stream} already exists")),
            CoreError::InvalidInput(msg) => Self::InvalidInput(msg),
            CoreError::InvalidPin => Self::InvalidInput(CoreError::InvalidPin.to_string()),
            CoreError::StaleInvite => Self::Forbidden(CoreError::StaleInvite.to_string()),
            other @ (CoreError::Log(_) | CoreError::Hashing(_)) => {
                error!(error = %other, "request failed");
                Self::Internal(String::from("internal server error"))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::InvalidInput(msg) | Self::InvalidUuid(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE.to_owned()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
