//! Unified error handling with Sentry integration.
//!
//! Every workflow error classifies itself into an [`ErrorKind`]; that kind
//! alone decides the HTTP status. Server-side failures are captured to Sentry
//! and the client only ever sees "Server error".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::otp::OtpError;
use crate::services::visits::VisitError;

/// Message sent to clients for any server-side failure.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// How a failure is reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Auth,
    Expired,
    NotFound,
    Server,
}

impl ErrorKind {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Auth => StatusCode::UNAUTHORIZED,
            Self::Expired => StatusCode::GONE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Server => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application-level error type returned by every handler.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account workflow failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// OTP workflow failed.
    #[error(transparent)]
    Otp(#[from] OtpError),

    /// Visit workflow failed.
    #[error(transparent)]
    Visit(#[from] VisitError),

    /// Storage failed outside of a workflow (e.g. readiness probe).
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Request body or path could not be decoded.
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(err) => err.kind(),
            Self::Otp(err) => err.kind(),
            Self::Visit(err) => err.kind(),
            Self::Database(_) => ErrorKind::Server,
            Self::BadRequest(_) => ErrorKind::Validation,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        // Don't expose internal error details to clients
        let message = if kind == ErrorKind::Server {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            SERVER_ERROR_MESSAGE.to_owned()
        } else {
            tracing::debug!(error = %self, status = %kind.status(), "Request rejected");
            self.to_string()
        };

        (kind.status(), message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_kind_status_table() {
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::Auth.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Expired.status(), StatusCode::GONE);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Server.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        let (status, body) = render(AuthError::UserAlreadyExists.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, "User already exists");

        let (status, body) = render(OtpError::Expired.into()).await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(body, "OTP expired");

        let (status, body) = render(VisitError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Visit not found");
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "row 7 has a bad email".to_owned(),
        ));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, SERVER_ERROR_MESSAGE);

        let (status, body) = render(AuthError::PasswordHash.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, SERVER_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_bad_request() {
        let (status, body) = render(AppError::BadRequest("Invalid JSON body".to_owned())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid JSON body");
    }
}
