//! Persistence layer for Shoptrail.
//!
//! # Database: `shoptrail`
//!
//! ## Tables
//!
//! - `shoptrail.users` - Accounts (email unique, Argon2 password hash)
//! - `shoptrail.otp_codes` - One live OTP per email
//! - `shoptrail.visits` - Shop visits with JSONB line items and a numeric total
//!
//! # Backends
//!
//! Workflows only see the [`UserStore`], [`OtpStore`] and [`VisitStore`]
//! traits, bundled in [`Storage`]. Production wires the `PostgreSQL`
//! repositories; tests and local demos use [`memory::MemoryStore`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p shoptrail-cli -- migrate
//! ```

pub mod memory;
pub mod otps;
pub mod users;
pub mod visits;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shoptrail_core::{Email, OtpCode, VisitId};

use crate::models::user::UserWithPassword;
use crate::models::{LineItem, OtpRecord, User, Visit};

pub use memory::MemoryStore;
pub use otps::PgOtpRepository;
pub use users::PgUserRepository;
pub use visits::PgVisitRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// An amount would leave the range a `Price` can hold.
    #[error("amount out of range")]
    OutOfRange,
}

/// Map a unique-constraint violation to `Conflict`, everything else to `Database`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Storage for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by exact email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Look up a user together with their password hash.
    async fn find_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<UserWithPassword>, RepositoryError>;

    /// Insert a user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken,
    /// even when a concurrent insert won the race.
    async fn create(&self, email: &Email, password_hash: &str) -> Result<User, RepositoryError>;
}

/// Storage for one-time passwords.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Drop any code held for `email` and store the new one, as one step.
    async fn replace_for_email(
        &self,
        email: &Email,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpRecord, RepositoryError>;

    /// Remove and return the record matching `email` and `code` exactly.
    ///
    /// Two concurrent callers with the same code cannot both receive it.
    async fn take(
        &self,
        email: &Email,
        code: &OtpCode,
    ) -> Result<Option<OtpRecord>, RepositoryError>;
}

/// Storage for shop visits.
#[async_trait]
pub trait VisitStore: Send + Sync {
    async fn create(&self, visit: &Visit) -> Result<(), RepositoryError>;

    async fn get(&self, id: VisitId) -> Result<Option<Visit>, RepositoryError>;

    /// Append `item` and add its price to the total atomically.
    ///
    /// Returns `RepositoryError::NotFound` if the visit does not exist and
    /// `RepositoryError::OutOfRange` if the new total would exceed
    /// `Price::MAX_AMOUNT`. Nothing is written in either case.
    async fn append_item(&self, id: VisitId, item: &LineItem) -> Result<Visit, RepositoryError>;

    /// Set `exited_at` on a visit that has not exited yet.
    ///
    /// Returns `RepositoryError::NotFound` for unknown visits and
    /// `RepositoryError::Conflict` if the exit was already recorded.
    async fn mark_exited(
        &self,
        id: VisitId,
        exited_at: DateTime<Utc>,
    ) -> Result<Visit, RepositoryError>;

    /// All visits, most recent `entered_at` first.
    async fn list_recent_first(&self) -> Result<Vec<Visit>, RepositoryError>;
}

#[derive(Clone)]
enum Backend {
    Postgres(PgPool),
    Memory,
}

/// The persistence handle injected into application state.
///
/// Cheap to clone. Constructed once at startup and closed on shutdown.
#[derive(Clone)]
pub struct Storage {
    users: Arc<dyn UserStore>,
    otps: Arc<dyn OtpStore>,
    visits: Arc<dyn VisitStore>,
    backend: Backend,
}

impl Storage {
    /// Storage backed by `PostgreSQL` repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            otps: Arc::new(PgOtpRepository::new(pool.clone())),
            visits: Arc::new(PgVisitRepository::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    /// Process-local storage; everything is lost on restart.
    #[must_use]
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            otps: store.clone(),
            visits: store,
            backend: Backend::Memory,
        }
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    #[must_use]
    pub fn otps(&self) -> &dyn OtpStore {
        self.otps.as_ref()
    }

    #[must_use]
    pub fn visits(&self) -> &dyn VisitStore {
        self.visits.as_ref()
    }

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        match &self.backend {
            Backend::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            Backend::Memory => Ok(()),
        }
    }

    /// Close the connection pool, waiting for checked-out connections.
    pub async fn close(&self) {
        if let Backend::Postgres(pool) = &self.backend {
            pool.close().await;
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
