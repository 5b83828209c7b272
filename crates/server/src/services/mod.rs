//! Business logic for Shoptrail.
//!
//! # Services
//!
//! - `auth` - Account registration and password login
//! - `otp` - One-time password issue and verification
//! - `visits` - Shop visit lifecycle (create, add product, exit, list)
//! - `analytics` - Dashboard chart series
//! - `clock` - Injectable time source
//!
//! Services borrow their store and clock from [`crate::state::AppState`] for
//! the duration of one request.

pub mod analytics;
pub mod auth;
pub mod clock;
pub mod otp;
pub mod visits;
