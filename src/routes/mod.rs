// Read-only HTTP + WebSocket access to published reports

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::models::{MonitorKind, Report, SystemInfo};
use crate::worker::{ReportChannels, ReportReceiver};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) channels: Arc<ReportChannels>,
    pub(crate) system_info: Arc<SystemInfo>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub(crate) fn receiver(&self, kind: MonitorKind) -> Option<ReportReceiver> {
        self.channels.get(&kind).cloned()
    }

    pub(crate) fn latest(&self, kind: MonitorKind) -> Option<Arc<Report>> {
        self.channels.get(&kind).and_then(|rx| rx.borrow().clone())
    }
}

pub fn app(
    channels: ReportChannels,
    system_info: Arc<SystemInfo>,
    ws_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        channels: Arc::new(channels),
        system_info,
        ws_connections,
    };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/system", get(http::system_handler)) // GET /api/system
        .route("/api/reports", get(http::reports_handler)) // GET /api/reports
        .route("/api/reports/{monitor}", get(http::report_handler)) // GET /api/reports/cpu
        .route("/ws/reports/{monitor}", get(ws::ws_reports)) // WS /ws/reports/cpu
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
