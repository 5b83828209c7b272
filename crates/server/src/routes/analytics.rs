//! Dashboard analytics route handler.

use std::collections::HashMap;

use axum::{Json, extract::Query};

use crate::services::analytics::AnalyticsSeries;

/// Chart data for `?range=`. Unknown or missing ranges give empty arrays.
///
/// The query is read as a plain map so repeated or unexpected keys never
/// turn into a rejection.
pub async fn show(Query(query): Query<HashMap<String, String>>) -> Json<AnalyticsSeries> {
    Json(AnalyticsSeries::lookup(query.get("range").map(String::as_str)))
}
