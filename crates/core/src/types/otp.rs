//! One-time password code.
//!
//! Codes are generated by the client (or an upstream mailer) and handed to
//! the server for storage, so the server only checks the shape. Comparison is
//! exact and case-sensitive.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpCodeError {
    #[error("otp cannot be empty")]
    Empty,
    #[error("otp must be at most {max} characters")]
    TooLong { max: usize },
}

/// A one-time password code.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OtpCode(String);

impl OtpCode {
    /// Maximum accepted code length.
    pub const MAX_LENGTH: usize = 64;

    /// Parse an OTP code. The value is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is empty or longer than [`Self::MAX_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, OtpCodeError> {
        if s.is_empty() {
            return Err(OtpCodeError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(OtpCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are credentials; keep them out of logs.
impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode([REDACTED])")
    }
}

impl TryFrom<String> for OtpCode {
    type Error = OtpCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OtpCode> for String {
    fn from(code: OtpCode) -> Self {
        code.0
    }
}
