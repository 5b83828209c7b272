//! Visit route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use shoptrail_core::VisitId;

use crate::error::{AppError, Result};
use crate::middleware::{ApiJson, optional_json};
use crate::models::visit::ExitVisit;
use crate::models::{NewLineItem, NewVisit, Visit};
use crate::services::visits::parse_visit_id;
use crate::state::AppState;

/// Response of `POST /visits`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSaved {
    pub message: &'static str,
    pub visit_id: VisitId,
}

/// Response of the routes that change an existing visit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitUpdated {
    pub message: &'static str,
    pub updated_visit: Visit,
}

/// Record a new visit.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewVisit>,
) -> Result<(StatusCode, Json<VisitSaved>)> {
    let visit = state.visits().create(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(VisitSaved {
            message: "Visit saved",
            visit_id: visit.id,
        }),
    ))
}

/// All visits, most recently entered first.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Visit>>> {
    Ok(Json(state.visits().list().await?))
}

/// A single visit.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Visit>> {
    let id = parse_visit_id(&id)?;
    Ok(Json(state.visits().get(id).await?))
}

/// Append a product to a visit.
///
/// A missing visit is reported as 404 even when the body is also unusable.
#[instrument(skip(state, body))]
pub async fn add_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<ApiJson<NewLineItem>, AppError>,
) -> Result<Json<VisitUpdated>> {
    let id = parse_visit_id(&id)?;
    let visits = state.visits();

    let item = match body {
        Ok(ApiJson(item)) => item,
        Err(err) => {
            visits.get(id).await?;
            return Err(err);
        }
    };

    let visit = visits.add_product(id, item).await?;
    Ok(Json(VisitUpdated {
        message: "Product added",
        updated_visit: visit,
    }))
}

/// Mark a visit as exited. The body (`{"exitedAt": ...}`) is optional.
#[instrument(skip(state, body))]
pub async fn exit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<VisitUpdated>> {
    let id = parse_visit_id(&id)?;
    let exit: ExitVisit = optional_json(&body)?;

    let visit = state.visits().exit(id, exit).await?;
    Ok(Json(VisitUpdated {
        message: "Visit exited",
        updated_visit: visit,
    }))
}
