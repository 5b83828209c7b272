//! Account route handlers.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{ApiJson, string_or_number};
use crate::state::AppState;

/// Body of `/register` and `/login`.
///
/// Missing fields decode as empty strings so the workflow decides how to
/// reject them.
#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default, deserialize_with = "string_or_number")]
    pub email: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub password: String,
}

/// Create an account.
#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<CredentialsForm>,
) -> Result<(StatusCode, &'static str)> {
    state.auth().register(&form.email, &form.password).await?;
    Ok((StatusCode::CREATED, "User registered"))
}

/// Check an email/password pair. No session is issued.
#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<CredentialsForm>,
) -> Result<&'static str> {
    let user = state.auth().login(&form.email, &form.password).await?;
    tracing::info!(user_id = %user.id, "Login successful");
    Ok("Login successful")
}
