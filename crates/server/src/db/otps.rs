//! OTP repository for `PostgreSQL`.
//!
//! `otp_codes.email` is unique, so "delete old codes, insert new one" is a
//! single upsert and verification is a single `DELETE ... RETURNING`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shoptrail_core::{Email, OtpCode, OtpId};

use super::{OtpStore, RepositoryError};
use crate::models::OtpRecord;

#[derive(sqlx::FromRow)]
struct OtpRow {
    id: i32,
    email: String,
    code: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OtpRow> for OtpRecord {
    type Error = RepositoryError;

    fn try_from(row: OtpRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid otp email: {e}")))?;
        let code = OtpCode::parse(&row.code)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid otp code: {e}")))?;

        Ok(Self {
            id: OtpId::new(row.id),
            email,
            code,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

/// Repository for one-time password storage.
pub struct PgOtpRepository {
    pool: PgPool,
}

impl PgOtpRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpStore for PgOtpRepository {
    async fn replace_for_email(
        &self,
        email: &Email,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpRecord, RepositoryError> {
        let row = sqlx::query_as::<_, OtpRow>(
            r"
            INSERT INTO shoptrail.otp_codes (email, code, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
                SET code = EXCLUDED.code,
                    expires_at = EXCLUDED.expires_at,
                    created_at = NOW()
            RETURNING id, email, code, expires_at, created_at
            ",
        )
        .bind(email)
        .bind(code.as_str())
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn take(
        &self,
        email: &Email,
        code: &OtpCode,
    ) -> Result<Option<OtpRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, OtpRow>(
            r"
            DELETE FROM shoptrail.otp_codes
            WHERE email = $1 AND code = $2
            RETURNING id, email, code, expires_at, created_at
            ",
        )
        .bind(email)
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(OtpRecord::try_from).transpose()
    }
}
