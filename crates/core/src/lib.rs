//! Shoptrail Core - Shared types library.
//!
//! This crate provides common types used across all Shoptrail components:
//! - `server` - HTTP API for registration, OTPs, visits and analytics
//! - `cli` - Command-line tools for migrations, users and seed data
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP. The optional `postgres` feature adds sqlx encode/decode
//! impls so the server can bind these types directly in queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, OTP codes, prices and analytics ranges

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
