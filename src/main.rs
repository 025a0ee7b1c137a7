use anyhow::Result;
use hostpulse::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        version = %version::user_agent(),
        monitors = ?app_config.enabled_monitors(),
        tick_interval_ms = app_config.monitoring.tick_interval_ms,
        "Starting"
    );

    let sysinfo = Arc::new(provider::SysinfoProvider::new(provider::ProviderConfig {
        latency_targets: app_config.monitoring.latency_targets.clone(),
        latency_timeout: std::time::Duration::from_millis(app_config.monitoring.latency_timeout_ms),
        // Every monitor ticks on the same interval; one refresh per tick
        process_refresh_interval: std::time::Duration::from_millis(
            app_config.monitoring.tick_interval_ms / 2,
        ),
    }));
    let system_info = sysinfo.system_info().await?;
    tracing::info!(
        host = %system_info.host_name,
        os = %system_info.operating_system,
        cpu = %system_info.cpu.model_name,
        "System identity collected"
    );
    let provider: Arc<dyn provider::MetricProvider> = sysinfo;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let monitors = worker::spawn_monitors(&app_config, provider, &shutdown_tx);

    if app_config.server.enabled {
        let app = routes::app(
            monitors.channels.clone(),
            Arc::new(system_info),
            Arc::new(AtomicUsize::new(0)),
        );
        let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Listening on http://{}", addr);

        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = shutdown_signal() => {
                tracing::info!("Received shutdown signal");
            }
        }
    } else {
        shutdown_signal().await;
        tracing::info!("Received shutdown signal");
    }

    // Workers observe this between ticks, never mid-tick
    let _ = shutdown_tx.send(());
    monitors.join().await;
    Ok(())
}
