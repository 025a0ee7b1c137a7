// One monitor's tick: sample -> derive -> update history -> report

use std::sync::Arc;

use crate::error::TickError;
use crate::history::HistoryBuffer;
use crate::models::{MetricSample, MonitorKind, ProcessEntry, Report};
use crate::monitors::MonitorSettings;
use crate::provider::MetricProvider;
use crate::ranking::RankSelector;
use crate::status::classify;
use crate::tree::build_forest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Sampling,
    Deriving,
    Updating,
    Reporting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub history_capacity: usize,
    pub top_n: usize,
    pub max_tree_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_capacity: crate::history::DEFAULT_HISTORY_CAPACITY,
            top_n: 10,
            max_tree_depth: 5,
        }
    }
}

impl PipelineConfig {
    pub fn from_app_config(config: &crate::config::AppConfig, kind: MonitorKind) -> Self {
        Self {
            history_capacity: config.monitoring.history_capacity,
            top_n: config.top_n_for(kind),
            max_tree_depth: config.monitoring.max_tree_depth,
        }
    }
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}

/// Owns one monitor's history. `&mut self` on `tick` keeps ticks from overlapping.
pub struct AggregationPipeline {
    settings: MonitorSettings,
    config: PipelineConfig,
    history: HistoryBuffer,
    ranker: RankSelector<ProcessEntry>,
    state: PipelineState,
    latest: Option<Arc<Report>>,
}

impl AggregationPipeline {
    pub fn new(settings: MonitorSettings, config: PipelineConfig) -> Self {
        let ranker = RankSelector::new(config.top_n, settings.dimensions());
        Self {
            history: HistoryBuffer::new(config.history_capacity),
            settings,
            config,
            ranker,
            state: PipelineState::Idle,
            latest: None,
        }
    }

    pub fn kind(&self) -> MonitorKind {
        self.settings.kind()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Last fully built report; unchanged by a failed tick.
    pub fn latest(&self) -> Option<Arc<Report>> {
        self.latest.clone()
    }

    pub fn reset_history(&mut self) {
        self.history.reset();
    }

    pub async fn tick<P: MetricProvider + ?Sized>(
        &mut self,
        provider: &P,
    ) -> Result<Arc<Report>, TickError> {
        self.tick_at(provider, now_ms()).await
    }

    /// A provider error aborts the tick before anything is mutated.
    pub async fn tick_at<P: MetricProvider + ?Sized>(
        &mut self,
        provider: &P,
        timestamp: u64,
    ) -> Result<Arc<Report>, TickError> {
        let kind = self.kind();

        self.state = PipelineState::Sampling;
        let raw = match provider.sample(kind).await {
            Ok(raw) => raw,
            Err(e) => {
                self.state = PipelineState::Idle;
                return Err(e.into());
            }
        };

        self.state = PipelineState::Deriving;
        let entities = self.settings.entities(&raw);
        let mut builder = MetricSample::builder(timestamp);
        if let Err(e) = self
            .settings
            .derive(&raw, &entities, &self.history, &mut builder)
        {
            self.state = PipelineState::Idle;
            return Err(e.into());
        }
        let (sample, rejected) = builder.build();
        for r in &rejected {
            tracing::debug!(
                monitor = %kind,
                field = %r.field,
                value = r.value,
                reason = ?r.reason,
                "dropped invalid sample value"
            );
        }

        self.state = PipelineState::Updating;
        let appended = self
            .history
            .append_sample(&sample, self.settings.tracked_series());

        self.state = PipelineState::Reporting;
        let rankings = self.ranker.rank(&entities);
        let tree = self
            .settings
            .is_hierarchical()
            .then(|| build_forest(&entities, self.config.max_tree_depth));
        let status = classify(&self.settings.checks(&sample));
        let entity_status = self
            .settings
            .entity_checks(&entities)
            .map(|checks| classify(&checks));

        let report = Arc::new(Report {
            timestamp,
            monitor: kind,
            derived_fields: sample.into_fields(),
            history: self.history.snapshot(),
            rankings,
            tree,
            status,
            entity_status,
            rejected,
        });
        self.latest = Some(report.clone());
        self.state = PipelineState::Idle;

        tracing::debug!(
            monitor = %kind,
            operation = "tick",
            points_appended = appended,
            overall = %report.status.overall,
            "tick complete"
        );
        Ok(report)
    }
}
