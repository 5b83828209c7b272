//! One-time password workflow.
//!
//! Per email: `NONE -> ISSUED -> {VERIFIED | EXPIRED} -> NONE`. Issuing
//! replaces any live code; verifying consumes the code whether it succeeds
//! or turns out to be expired.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use shoptrail_core::{Email, OtpCode};

use super::clock::Clock;
use crate::db::{OtpStore, RepositoryError};
use crate::error::ErrorKind;
use crate::models::OtpRecord;

/// Errors that can occur while issuing or verifying a code.
#[derive(Debug, Error)]
pub enum OtpError {
    /// Email or code absent or empty on issue.
    #[error("Email and OTP required")]
    MissingFields,

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] shoptrail_core::EmailError),

    #[error("Invalid OTP format: {0}")]
    InvalidCode(#[from] shoptrail_core::OtpCodeError),

    /// No live code matches the email and code given.
    #[error("Invalid OTP")]
    InvalidOtp,

    /// The code matched but its window had passed. It is gone now.
    #[error("OTP expired")]
    Expired,

    /// `now + ttl` is not representable.
    #[error("OTP lifetime out of range")]
    TtlOutOfRange,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl OtpError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFields | Self::InvalidEmail(_) | Self::InvalidCode(_) => {
                ErrorKind::Validation
            }
            Self::InvalidOtp => ErrorKind::Auth,
            Self::Expired => ErrorKind::Expired,
            Self::TtlOutOfRange | Self::Repository(_) => ErrorKind::Server,
        }
    }
}

/// OTP issue/verify service.
pub struct OtpService<'a> {
    otps: &'a dyn OtpStore,
    clock: &'a dyn Clock,
    ttl: Duration,
}

impl<'a> OtpService<'a> {
    #[must_use]
    pub const fn new(otps: &'a dyn OtpStore, clock: &'a dyn Clock, ttl: Duration) -> Self {
        Self { otps, clock, ttl }
    }

    /// Store `code` as the only live OTP for `email`, valid for the TTL.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::MissingFields` if either value is empty, and
    /// `OtpError::InvalidEmail`/`OtpError::InvalidCode` if they don't parse.
    pub async fn issue(&self, email: &str, code: &str) -> Result<OtpRecord, OtpError> {
        if email.trim().is_empty() || code.is_empty() {
            return Err(OtpError::MissingFields);
        }
        let email = Email::parse(email)?;
        let code = OtpCode::parse(code)?;
        let expires_at = self.expiry_from(self.clock.now())?;

        let record = self
            .otps
            .replace_for_email(&email, &code, expires_at)
            .await?;

        tracing::debug!(otp_id = %record.id, expires_at = %record.expires_at, "OTP stored");
        Ok(record)
    }

    /// Check `code` against the live OTP for `email` and consume it.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::InvalidOtp` if nothing matches (including missing or
    /// malformed input) and `OtpError::Expired` if the match is past its window.
    pub async fn verify(&self, email: &str, code: &str) -> Result<(), OtpError> {
        let (Ok(email), Ok(code)) = (Email::parse(email), OtpCode::parse(code)) else {
            return Err(OtpError::InvalidOtp);
        };

        let record = self
            .otps
            .take(&email, &code)
            .await?
            .ok_or(OtpError::InvalidOtp)?;

        if record.is_expired(self.clock.now()) {
            tracing::debug!(otp_id = %record.id, "Expired OTP discarded");
            return Err(OtpError::Expired);
        }

        Ok(())
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, OtpError> {
        TimeDelta::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(OtpError::TtlOutOfRange)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::db::MemoryStore;
    use crate::services::clock::ManualClock;

    const TTL: Duration = Duration::from_secs(300);

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_issue_sets_expiry_from_clock() {
        let store = MemoryStore::new();
        let clock = clock();
        let service = OtpService::new(&store, &clock, TTL);

        let record = service.issue("a@b.c", "123456").await.unwrap();
        assert_eq!(record.expires_at, clock.now() + TimeDelta::minutes(5));
    }

    #[tokio::test]
    async fn test_verify_succeeds_once() {
        let store = MemoryStore::new();
        let clock = clock();
        let service = OtpService::new(&store, &clock, TTL);

        service.issue("a@b.c", "123456").await.unwrap();
        service.verify("a@b.c", "123456").await.unwrap();
        assert!(matches!(
            service.verify("a@b.c", "123456").await,
            Err(OtpError::InvalidOtp)
        ));
    }

    #[tokio::test]
    async fn test_expired_code_is_removed() {
        let store = MemoryStore::new();
        let clock = clock();
        let service = OtpService::new(&store, &clock, TTL);

        service.issue("a@b.c", "123456").await.unwrap();
        clock.advance(TimeDelta::minutes(5) + TimeDelta::seconds(1));

        assert!(matches!(
            service.verify("a@b.c", "123456").await,
            Err(OtpError::Expired)
        ));
        assert!(matches!(
            service.verify("a@b.c", "123456").await,
            Err(OtpError::InvalidOtp)
        ));
    }

    #[tokio::test]
    async fn test_code_valid_at_exact_expiry() {
        let store = MemoryStore::new();
        let clock = clock();
        let service = OtpService::new(&store, &clock, TTL);

        service.issue("a@b.c", "123456").await.unwrap();
        clock.advance(TimeDelta::minutes(5));
        service.verify("a@b.c", "123456").await.unwrap();
    }

    #[tokio::test]
    async fn test_reissue_replaces_previous_code() {
        let store = MemoryStore::new();
        let clock = clock();
        let service = OtpService::new(&store, &clock, TTL);

        service.issue("a@b.c", "111111").await.unwrap();
        service.issue("a@b.c", "222222").await.unwrap();

        assert!(matches!(
            service.verify("a@b.c", "111111").await,
            Err(OtpError::InvalidOtp)
        ));
        service.verify("a@b.c", "222222").await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_live_code() {
        let store = MemoryStore::new();
        let clock = clock();
        let service = OtpService::new(&store, &clock, TTL);

        service.issue("a@b.c", "123456").await.unwrap();
        assert!(matches!(
            service.verify("a@b.c", "654321").await,
            Err(OtpError::InvalidOtp)
        ));
        service.verify("a@b.c", "123456").await.unwrap();
    }

    #[tokio::test]
    async fn test_code_is_case_sensitive() {
        let store = MemoryStore::new();
        let clock = clock();
        let service = OtpService::new(&store, &clock, TTL);

        service.issue("a@b.c", "AbC123").await.unwrap();
        assert!(matches!(
            service.verify("a@b.c", "abc123").await,
            Err(OtpError::InvalidOtp)
        ));
    }

    #[tokio::test]
    async fn test_issue_validation() {
        let store = MemoryStore::new();
        let clock = clock();
        let service = OtpService::new(&store, &clock, TTL);

        assert!(matches!(service.issue("", "1").await, Err(OtpError::MissingFields)));
        assert!(matches!(service.issue("a@b.c", "").await, Err(OtpError::MissingFields)));
        assert!(matches!(
            service.issue("nope", "1").await,
            Err(OtpError::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_missing_fields_is_auth_failure() {
        let store = MemoryStore::new();
        let clock = clock();
        let service = OtpService::new(&store, &clock, TTL);

        let err = service.verify("", "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
    }
}
