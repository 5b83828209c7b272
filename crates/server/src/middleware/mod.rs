//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. CORS (frontend origin, credentials allowed)
//! 3. `TraceLayer` (request span with status and latency)
//! 4. Request ID (recorded on the span opened by 3)

pub mod json;
pub mod request_id;

pub use json::{ApiJson, optional_json, string_or_number};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
