// WebSocket report stream: pushes every newly published report for one monitor

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::time::{Duration, timeout};

use super::AppState;
use super::http::not_found;
use crate::models::MonitorKind;
use crate::worker::ReportReceiver;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the connection count on drop (connect = +1, drop = -1).
struct WsConnectionGuard(Arc<AtomicUsize>);

impl Drop for WsConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
    }
}

pub(super) async fn ws_reports(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(monitor): Path<String>,
) -> Response {
    let kind: MonitorKind = match monitor.parse() {
        Ok(k) => k,
        Err(e) => return not_found(format!("{}", e)),
    };
    let Some(rx) = state.receiver(kind) else {
        return not_found(format!("monitor {} is not enabled", kind));
    };
    let conn_count = state.ws_connections.clone();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_reports(socket, rx, kind, conn_count).await {
            tracing::info!(monitor = %kind, "Report stream error: {}", e);
        }
    })
    .into_response()
}

async fn send_text(socket: &mut WebSocket, json: String) -> bool {
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    matches!(r, Ok(Ok(())))
}

async fn stream_reports(
    mut socket: WebSocket,
    mut rx: ReportReceiver,
    kind: MonitorKind,
    conn_count: Arc<AtomicUsize>,
) -> anyhow::Result<()> {
    conn_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let _guard = WsConnectionGuard(conn_count.clone());
    tracing::info!(
        monitor = %kind,
        ws_clients = conn_count.load(std::sync::atomic::Ordering::Relaxed),
        "Client connected to report stream"
    );

    // Current report first, if any, then one message per change
    let current = rx.borrow_and_update().clone();
    if let Some(report) = current
        && !send_text(&mut socket, serde_json::to_string(report.as_ref())?).await
    {
        return Ok(());
    }

    let mut ping_interval =
        tokio::time::interval_at(tokio::time::Instant::now() + WS_PING_INTERVAL, WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    // worker stopped
                    break;
                }
                let report = rx.borrow_and_update().clone();
                if let Some(report) = report
                    && !send_text(&mut socket, serde_json::to_string(report.as_ref())?).await
                {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
        }
    }
    Ok(())
}
