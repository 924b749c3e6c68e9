//! HTTP error boundary.
//!
//! Every failure leaving a handler is turned into an `ApiError`, which renders
//! as `{"message": "..."}`. The status code is chosen here, once, from the
//! error kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rootcause::Report;
use serde::Serialize;
use wongnok_platform_access::{AuthenticationError, AuthorizationError, UserError};

/// Error response with a status code and a client-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

impl ApiError {
    /// Creates an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 401 error with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Login flow errors: a bad state is the client's fault, anything after it
/// is a server-side failure.
impl From<AuthenticationError> for ApiError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidState => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            other => {
                tracing::error!(error = %other, "authentication flow failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        Self::unauthorized(err.to_string())
    }
}

impl From<&UserError> for ApiError {
    fn from(err: &UserError) -> Self {
        let status = match err {
            UserError::NotFound { .. } => StatusCode::NOT_FOUND,
            UserError::InvalidProfile { .. } => StatusCode::BAD_REQUEST,
            UserError::InvalidClaims { .. }
            | UserError::FindFailed { .. }
            | UserError::UpsertFailed { .. } => {
                tracing::error!(error = %err, "user operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<Report<UserError>> for ApiError {
    fn from(report: Report<UserError>) -> Self {
        Self::from(report.current_context())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
