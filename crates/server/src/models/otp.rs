//! One-time password records.

use chrono::{DateTime, Utc};

use shoptrail_core::{Email, OtpCode, OtpId};

/// A stored one-time password for an email address.
///
/// At most one record per email is live once an issue call settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub id: OtpId,
    pub email: Email,
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// A record is expired once `now` is strictly past its expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
