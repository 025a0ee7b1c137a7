// Periodic scheduler: one task per monitor drives its pipeline one tick at a time.
// A slow tick makes the interval skip triggers; stop requests are seen only between ticks.

use crate::config::AppConfig;
use crate::models::{MonitorKind, Report};
use crate::monitors::MonitorSettings;
use crate::pipeline::{AggregationPipeline, PipelineConfig};
use crate::provider::MetricProvider;
use crate::status::Severity;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, watch};
use tokio::time::{Duration, interval};

/// Latest published report per monitor; `None` until the first successful tick.
pub type ReportReceiver = watch::Receiver<Option<Arc<Report>>>;
pub type ReportChannels = BTreeMap<MonitorKind, ReportReceiver>;

#[derive(Debug, Default)]
pub struct TickCounters {
    ok: AtomicU64,
    failed: AtomicU64,
}

impl TickCounters {
    pub fn ok(&self) -> u64 {
        self.ok.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Provider, publish channel, counters and shutdown for one worker.
pub struct WorkerDeps {
    pub provider: Arc<dyn MetricProvider>,
    pub report_tx: watch::Sender<Option<Arc<Report>>>,
    pub counters: Arc<TickCounters>,
    pub shutdown_rx: broadcast::Receiver<()>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub tick_interval_ms: u64,
    /// How often to log tick counters (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(
    mut pipeline: AggregationPipeline,
    deps: WorkerDeps,
    config: WorkerConfig,
) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        provider,
        report_tx,
        counters,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        tick_interval_ms,
        stats_log_interval_secs,
    } = config;
    let monitor = pipeline.kind();

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(tick_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // first tick of an interval completes immediately
        stats_log_tick.tick().await;

        let mut last_overall: Option<Severity> = None;

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    tracing::debug!(monitor = %monitor, "Worker shutting down");
                    break;
                }
                _ = tick.tick() => {
                    match pipeline.tick(provider.as_ref()).await {
                        Ok(report) => {
                            counters.ok.fetch_add(1, Ordering::Relaxed);
                            let overall = report.status.overall;
                            if last_overall != Some(overall) {
                                let previous = last_overall.map_or("none", |s| s.as_str());
                                tracing::info!(
                                    monitor = %monitor,
                                    previous,
                                    status = %overall,
                                    flags = report.status.active_flags.len(),
                                    "status changed"
                                );
                                last_overall = Some(overall);
                            }
                            // send_replace publishes even when no reader is subscribed
                            report_tx.send_replace(Some(report));
                        }
                        Err(e) => {
                            counters.failed.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(
                                error = %e,
                                monitor = %monitor,
                                operation = "tick",
                                "tick failed"
                            );
                        }
                    }
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        monitor = %monitor,
                        ticks_ok = counters.ok(),
                        ticks_failed = counters.failed(),
                        history_series = pipeline.history().series_names().count(),
                        "monitor stats"
                    );
                }
            }
        }
    })
}

/// Handles for every spawned monitor.
pub struct Monitors {
    pub channels: ReportChannels,
    pub counters: BTreeMap<MonitorKind, Arc<TickCounters>>,
    pub handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Monitors {
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "worker task join failed");
            }
        }
    }
}

/// One worker per enabled monitor, all sharing `provider`.
pub fn spawn_monitors(
    config: &AppConfig,
    provider: Arc<dyn MetricProvider>,
    shutdown_tx: &broadcast::Sender<()>,
) -> Monitors {
    let mut monitors = Monitors {
        channels: BTreeMap::new(),
        counters: BTreeMap::new(),
        handles: Vec::new(),
    };
    for kind in config.enabled_monitors() {
        let pipeline = AggregationPipeline::new(
            MonitorSettings::from_config(config, kind),
            PipelineConfig::from_app_config(config, kind),
        );
        let (report_tx, report_rx) = watch::channel(None);
        let counters = Arc::new(TickCounters::default());
        let handle = spawn(
            pipeline,
            WorkerDeps {
                provider: provider.clone(),
                report_tx,
                counters: counters.clone(),
                shutdown_rx: shutdown_tx.subscribe(),
            },
            WorkerConfig {
                tick_interval_ms: config.monitoring.tick_interval_ms,
                stats_log_interval_secs: config.monitoring.stats_log_interval_secs,
            },
        );
        tracing::info!(monitor = %kind, "monitor started");
        monitors.channels.insert(kind, report_rx);
        monitors.counters.insert(kind, counters);
        monitors.handles.push(handle);
    }
    monitors
}
