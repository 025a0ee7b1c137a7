// GET handlers: version, system identity, reports

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;

use super::AppState;
use crate::models::MonitorKind;
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

pub(super) fn not_found(message: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// GET /api/system: static host identity collected at startup.
pub(super) async fn system_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.system_info.as_ref().clone())
}

/// GET /api/reports: latest report per monitor that has completed a tick.
pub(super) async fn reports_handler(State(state): State<AppState>) -> impl IntoResponse {
    let reports: BTreeMap<MonitorKind, _> = state
        .channels
        .keys()
        .filter_map(|kind| state.latest(*kind).map(|r| (*kind, r.as_ref().clone())))
        .collect();
    Json(reports)
}

/// GET /api/reports/{monitor}: 404 for unknown or disabled monitors and before the first tick.
pub(super) async fn report_handler(
    State(state): State<AppState>,
    Path(monitor): Path<String>,
) -> Response {
    let kind: MonitorKind = match monitor.parse() {
        Ok(k) => k,
        Err(e) => return not_found(format!("{}", e)),
    };
    match state.latest(kind) {
        Some(report) => Json(report.as_ref()).into_response(),
        None => not_found(format!("no report for {} yet", kind)),
    }
}
