//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use shoptrail_core::{Email, UserId};

/// A registered shopper account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address (unique).
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// A user together with their stored Argon2 PHC hash string.
///
/// Only the auth workflow ever sees this; handlers get [`User`].
#[derive(Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

impl std::fmt::Debug for UserWithPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserWithPassword")
            .field("user", &self.user)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}
