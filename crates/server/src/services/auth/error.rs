//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::error::ErrorKind;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password absent or empty.
    #[error("Email and password required")]
    MissingCredentials,

    /// Invalid email format.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] shoptrail_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("User already exists")]
    UserAlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredentials | Self::InvalidEmail(_) => ErrorKind::Validation,
            Self::InvalidCredentials => ErrorKind::Auth,
            Self::UserAlreadyExists => ErrorKind::Conflict,
            Self::Repository(_) | Self::PasswordHash => ErrorKind::Server,
        }
    }
}
