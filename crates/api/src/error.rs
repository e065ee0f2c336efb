//! HTTP error type.
//!
//! Every handler returns `Result<_, ApiError>`. The `IntoResponse` impl maps
//! each variant to a status code and a `{"error": "..."}` body. Server-side
//! failures are reported to Sentry and their details scrubbed from the
//! response.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::engine::EngineError;
use crate::services::auth::AuthError;
use crate::store::StoreError;

/// API-level errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or semantically invalid request.
    #[error("{0}")]
    InvalidArgument(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    PermissionDenied(String),

    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with existing state.
    #[error("{0}")]
    Conflict(String),

    /// Authentication subsystem error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Document store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Anything else that should read as a server fault.
    #[error("{0}")]
    Internal(String),
}

impl From<crate::store::ApplyError<Self>> for ApiError {
    fn from(err: crate::store::ApplyError<Self>) -> Self {
        match err {
            crate::store::ApplyError::Store(e) => Self::Store(e),
            crate::store::ApplyError::Rejected(e) => e,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            EngineError::NotFound(msg) => Self::NotFound(msg),
            EngineError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            EngineError::Store(e) => Self::Store(e),
        }
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::PermissionDenied(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, err.to_string())
                }
                AuthError::UserAlreadyExists => (StatusCode::CONFLICT, err.to_string()),
                AuthError::TokenIssuance(_) | AuthError::Store(_) | AuthError::PasswordHash => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                ),
            },
            Self::Store(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        }
    }

    const fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Store(_)
                | Self::Internal(_)
                | Self::Auth(
                    AuthError::TokenIssuance(_) | AuthError::Store(_) | AuthError::PasswordHash
                )
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if self.is_server_fault() {
            tracing::error!(error = %self, "request failed");
            sentry::capture_error(&self);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
