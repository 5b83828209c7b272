//! Core types for Shoptrail.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod analytics;
pub mod email;
pub mod id;
pub mod otp;
pub mod price;

pub use analytics::{AnalyticsRange, UnknownRange};
pub use email::{Email, EmailError};
pub use id::*;
pub use otp::{OtpCode, OtpCodeError};
pub use price::{Price, PriceError};
