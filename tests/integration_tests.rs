// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum_test::TestServer;
use common::*;
use hostpulse::models::{MonitorKind, Report, SystemInfo};
use hostpulse::monitors::MonitorSettings;
use hostpulse::pipeline::{AggregationPipeline, PipelineConfig};
use hostpulse::routes;
use hostpulse::status::Severity;
use hostpulse::worker::{ReportChannels, ReportReceiver};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::watch;

type ReportSender = watch::Sender<Option<Arc<Report>>>;

async fn cpu_report(timestamp: u64) -> Arc<Report> {
    let provider = FakeProvider::repeating(cpu_snapshot(95.0, &[95.0, 40.0]));
    let mut pipeline = AggregationPipeline::new(
        MonitorSettings::default_for(MonitorKind::Cpu),
        PipelineConfig::default(),
    );
    pipeline.tick_at(&provider, timestamp).await.expect("tick")
}

/// CPU has a published report, memory is enabled but has not ticked, the rest are disabled.
async fn test_app() -> (axum::Router, ReportSender) {
    let (cpu_tx, cpu_rx): (ReportSender, ReportReceiver) =
        watch::channel(Some(cpu_report(1_000).await));
    let (_memory_tx, memory_rx) = watch::channel(None);
    let mut channels = ReportChannels::new();
    channels.insert(MonitorKind::Cpu, cpu_rx);
    channels.insert(MonitorKind::Memory, memory_rx);
    let app = routes::app(
        channels,
        Arc::new(system_info()),
        Arc::new(AtomicUsize::new(0)),
    );
    (app, cpu_tx)
}

/// Build TestServer with http_transport (required for WebSocket tests).
async fn test_server_with_http() -> (TestServer, ReportSender) {
    let (app, tx) = test_app().await;
    let server = TestServer::builder().http_transport().try_build(app).unwrap();
    (server, tx)
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("hostpulse")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_system_endpoint_returns_host_identity() {
    let (app, _) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/system").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["hostName"], "rack-01");
    assert_eq!(json["cpu"]["logicalCores"], 32);
    let info: SystemInfo = response.json();
    assert_eq!(info, system_info());
    assert_eq!(info.uptime_secs(1_700_000_600), 600);
}

#[tokio::test]
async fn test_report_endpoint_returns_latest_report() {
    let (app, _tx) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/reports/cpu").await;
    response.assert_status_ok();
    let report: Report = response.json();
    assert_eq!(report.timestamp, 1_000);
    assert_eq!(report.monitor, MonitorKind::Cpu);
    assert_eq!(report.field("cpu.usage"), Some(95.0));
    assert_eq!(report.overall(), Severity::Critical);
}

#[tokio::test]
async fn test_report_endpoint_is_case_insensitive() {
    let (app, _tx) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    server.get("/api/reports/CPU").await.assert_status_ok();
}

#[tokio::test]
async fn test_report_endpoint_404_before_first_tick() {
    let (app, _tx) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/reports/memory").await;
    response.assert_status_not_found();
    let json: serde_json::Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("memory"));
}

#[tokio::test]
async fn test_report_endpoint_404_for_disabled_and_unknown_monitor() {
    let (app, _tx) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    server.get("/api/reports/disk").await.assert_status_not_found();
    let response = server.get("/api/reports/gpu").await;
    response.assert_status_not_found();
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "unknown monitor: gpu");
}

#[tokio::test]
async fn test_reports_endpoint_lists_only_published_monitors() {
    let (app, _tx) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/reports").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    let obj = json.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    assert_eq!(obj["cpu"]["timestamp"], 1_000);
}

#[tokio::test]
async fn test_report_endpoint_sees_newly_published_report() {
    let (app, tx) = test_app().await;
    let server = TestServer::try_new(app).unwrap();
    tx.send_replace(Some(cpu_report(2_000).await));
    let report: Report = server.get("/api/reports/cpu").await.json();
    assert_eq!(report.timestamp, 2_000);
}

// --- WebSocket message tests (require http_transport + ws feature) ---
// Receive until we get valid JSON (server may send Ping first).

async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_sends_current_report_on_connect() {
    let (server, _tx) = test_server_with_http().await;
    let mut ws = server
        .get_websocket("/ws/reports/cpu")
        .await
        .into_websocket()
        .await;
    let report: Report = receive_first_json_text(&mut ws).await;
    assert_eq!(report.timestamp, 1_000);
}

#[tokio::test]
async fn test_ws_pushes_each_new_report() {
    let (server, tx) = test_server_with_http().await;
    let mut ws = server
        .get_websocket("/ws/reports/cpu")
        .await
        .into_websocket()
        .await;
    let first: Report = receive_first_json_text(&mut ws).await;
    assert_eq!(first.timestamp, 1_000);

    let next = cpu_report(2_000).await;
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        tx.send_replace(Some(next));
        // keep the channel open while the client reads
        tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;
    });
    let second: Report = receive_first_json_text(&mut ws).await;
    assert_eq!(second.timestamp, 2_000);
}

#[tokio::test]
async fn test_ws_404_for_disabled_monitor() {
    let (server, _tx) = test_server_with_http().await;
    server
        .get_websocket("/ws/reports/disk")
        .await
        .assert_status_not_found();
}
