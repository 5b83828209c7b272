//! Domain models for the Shoptrail server.
//!
//! These types are what the workflows and repositories exchange. Request
//! bodies that need validation (`NewVisit`, `NewLineItem`) live next to the
//! record they produce.

pub mod otp;
pub mod user;
pub mod visit;

pub use otp::OtpRecord;
pub use user::User;
pub use visit::{LineItem, NewLineItem, NewVisit, Visit};
