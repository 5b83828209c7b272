//! One-time password route handlers.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{ApiJson, string_or_number};
use crate::state::AppState;

/// Body of `/send-otp` and `/verify-otp`.
#[derive(Deserialize)]
pub struct OtpForm {
    #[serde(default, deserialize_with = "string_or_number")]
    pub email: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub otp: String,
}

/// Store a code for an email, replacing any previous one.
#[instrument(skip(state, form))]
pub async fn send_otp(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<OtpForm>,
) -> Result<&'static str> {
    state.otp().issue(&form.email, &form.otp).await?;
    Ok("OTP stored")
}

/// Verify and consume a code.
#[instrument(skip(state, form))]
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<OtpForm>,
) -> Result<&'static str> {
    state.otp().verify(&form.email, &form.otp).await?;
    Ok("OTP verified")
}
