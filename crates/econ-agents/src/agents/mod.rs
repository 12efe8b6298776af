//! Domain agents and their shared analysis lifecycle
//!
//! Every agent runs `collect -> analyze -> generate_insights -> visualize`.
//! The per-domain steps live behind [`DomainAnalyzer`]; the lifecycle itself
//! is provided once for all of them through [`EconomicAgent`].

pub mod gdp;
pub mod inflation;
pub mod trade;

pub use gdp::{GdpAgent, GdpAnalysis};
pub use inflation::{InflationAgent, InflationAnalysis};
pub use trade::{TradeAgent, TradeAnalysis};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::api::DataSource;
use crate::cache::{FetchOutcome, SeriesCache};
use crate::charts::{ChartSpec, ChartWriter, JsonChartWriter};
use crate::config::{AnalysisWindow, DateRange, EconConfig, SeriesSpec};
use crate::domain::Domain;
use crate::error::{EconError, Result};
use crate::insights::InsightBundle;
use crate::metrics::{SummaryStats, summary_stats};
use crate::report::DataWriter;
use crate::series::{Frequency, TimeSeries};

/// Collected series keyed by indicator name
pub type SeriesSet = BTreeMap<String, TimeSeries>;

/// A catalog entry that could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub name: String,
    pub series_id: String,
    pub reason: String,
}

/// Tuning shared by all analyzers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSettings {
    pub volatility_window: usize,
    pub analysis_windows: Vec<AnalysisWindow>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let config = EconConfig::default();
        Self::from(&config)
    }
}

impl From<&EconConfig> for AnalysisSettings {
    fn from(config: &EconConfig) -> Self {
        Self {
            volatility_window: config.volatility_window,
            analysis_windows: config.analysis_windows.clone(),
        }
    }
}

/// State every agent owns: its catalog slice, cache and chart output
pub struct AgentCore {
    domain: Domain,
    series: Vec<SeriesSpec>,
    cache: SeriesCache,
    settings: AnalysisSettings,
    chart_writer: Option<Arc<dyn ChartWriter>>,
    data_writer: Option<DataWriter>,
    last_run: RwLock<Option<DateTime<Utc>>>,
}

impl AgentCore {
    pub fn new(domain: Domain, series: Vec<SeriesSpec>, source: Arc<dyn DataSource>, settings: AnalysisSettings) -> Self {
        Self {
            domain,
            series,
            cache: SeriesCache::new(source),
            settings,
            chart_writer: None,
            data_writer: None,
            last_run: RwLock::new(None),
        }
    }

    /// Build from configuration
    ///
    /// Collected data is exported to `<output>/data`; charts go to
    /// `<output>/charts` when enabled.
    pub fn from_config(domain: Domain, config: &EconConfig, source: Arc<dyn DataSource>) -> Self {
        let core = Self::new(
            domain,
            config.series_for(domain).to_vec(),
            source,
            AnalysisSettings::from(config),
        )
        .with_data_writer(DataWriter::new(config.data_dir()));
        if config.write_charts {
            core.with_chart_writer(Arc::new(JsonChartWriter::new(config.charts_dir())))
        } else {
            core
        }
    }

    pub fn with_chart_writer(mut self, writer: Arc<dyn ChartWriter>) -> Self {
        self.chart_writer = Some(writer);
        self
    }

    pub fn with_data_writer(mut self, writer: DataWriter) -> Self {
        self.data_writer = Some(writer);
        self
    }

    pub fn name(&self) -> &'static str {
        self.domain.agent_name()
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Fetch every catalog entry; entries without data are left out
    pub async fn collect(&self, range: &DateRange) -> (SeriesSet, Vec<FetchFailure>) {
        tracing::info!(agent = self.name(), "Collecting {} data...", self.domain);

        let outcomes = join_all(self.series.iter().map(|spec| async move {
            let outcome = self.cache.fetch(&spec.series_id, range.start, range.end).await;
            (spec, outcome)
        }))
        .await;

        let mut data = SeriesSet::new();
        let mut failures = Vec::new();
        for (spec, outcome) in outcomes {
            match outcome {
                FetchOutcome::Data(series) => {
                    tracing::info!(agent = self.name(), "Collected {} data points for {}", series.len(), spec.name);
                    data.insert(spec.name.clone(), series);
                }
                FetchOutcome::NoData => {
                    tracing::warn!(agent = self.name(), "No data available for {} ({})", spec.name, spec.series_id);
                }
                FetchOutcome::Failed { reason } => {
                    failures.push(FetchFailure {
                        name: spec.name.clone(),
                        series_id: spec.series_id.clone(),
                        reason,
                    });
                }
            }
        }
        (data, failures)
    }

    /// Export collected series; a failed write is logged and yields `None`
    pub fn save_data(&self, data: &SeriesSet) -> Option<PathBuf> {
        let writer = self.data_writer.as_ref()?;
        match writer.write_series_set(self.name(), self.domain, data) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::error!(agent = self.name(), "Failed to save {} data: {e}", self.domain);
                None
            }
        }
    }

    /// Persist charts; failures are logged and skipped
    pub fn save_charts(&self, charts: Vec<(&'static str, ChartSpec)>) -> Vec<PathBuf> {
        let Some(writer) = &self.chart_writer else {
            return Vec::new();
        };

        charts
            .into_iter()
            .filter(|(_, spec)| !spec.is_empty())
            .filter_map(|(name, spec)| match writer.write(self.name(), name, &spec) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::error!(agent = self.name(), "Failed to write chart {name}: {e}");
                    None
                }
            })
            .collect()
    }
}

/// Periods per year of `series`, falling back when it is too short to tell
pub(crate) fn periods_per_year(series: &TimeSeries, fallback: Frequency) -> usize {
    series.frequency().unwrap_or(fallback).periods_per_year()
}

/// Domain-specific analysis steps
pub trait DomainAnalyzer: Send + Sync {
    type Analysis: Into<DomainAnalysis> + Send;

    fn core(&self) -> &AgentCore;

    /// Derive metrics; missing inputs only remove the metrics that need them
    fn analyze(&self, data: &SeriesSet) -> Self::Analysis;

    fn generate_insights(&self, analysis: &Self::Analysis) -> InsightBundle;

    /// Chart specs keyed by file base name
    fn visualize(&self, data: &SeriesSet, analysis: &Self::Analysis) -> Vec<(&'static str, ChartSpec)>;
}

/// Object-safe view of an agent used by the orchestrator
#[async_trait]
pub trait EconomicAgent: Send + Sync {
    fn name(&self) -> &str;

    fn domain(&self) -> Domain;

    /// Run the full pipeline for `range`
    async fn run_analysis(&self, range: &DateRange) -> Result<AgentReport>;

    async fn status(&self) -> AgentStatus;

    async fn clear_cache(&self);
}

#[async_trait]
impl<T> EconomicAgent for T
where
    T: DomainAnalyzer,
{
    fn name(&self) -> &str {
        self.core().name()
    }

    fn domain(&self) -> Domain {
        self.core().domain()
    }

    async fn run_analysis(&self, range: &DateRange) -> Result<AgentReport> {
        let core = self.core();
        let name = core.name();
        tracing::info!(agent = name, "Starting {name} analysis from {} to {}", range.start, range.end);

        let (data, fetch_failures) = core.collect(range).await;
        if data.is_empty() {
            tracing::warn!(agent = name, "No data collected for {name}");
            return Err(EconError::DataUnavailable {
                subject: name.to_string(),
                reason: "no series could be collected".to_string(),
            });
        }

        let data_file = core.save_data(&data);

        tracing::info!(agent = name, "Analyzing {} data...", core.domain());
        let analysis = self.analyze(&data);

        tracing::info!(agent = name, "Generating {} insights...", core.domain());
        let insights = self.generate_insights(&analysis);

        let charts = if core.chart_writer.is_some() {
            tracing::info!(agent = name, "Creating {} visualizations...", core.domain());
            core.save_charts(self.visualize(&data, &analysis))
        } else {
            Vec::new()
        };

        let data_summary = data
            .iter()
            .filter_map(|(key, series)| summary_stats(series).map(|stats| (key.clone(), stats)))
            .collect();

        let report = AgentReport {
            agent_name: name.to_string(),
            domain: core.domain(),
            analysis_period: *range,
            data_summary,
            analysis: analysis.into(),
            insights,
            charts,
            data_file,
            fetch_failures,
            timestamp: Utc::now(),
        };

        *core.last_run.write().await = Some(report.timestamp);
        tracing::info!(agent = name, "Completed {name} analysis");
        Ok(report)
    }

    async fn status(&self) -> AgentStatus {
        let core = self.core();
        AgentStatus {
            name: core.name().to_string(),
            domain: core.domain(),
            last_analysis: *core.last_run.read().await,
            cache_size: core.cache.len().await,
        }
    }

    async fn clear_cache(&self) {
        self.core().cache.clear().await;
    }
}

/// Typed analysis of any domain
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum DomainAnalysis {
    Inflation(InflationAnalysis),
    Gdp(GdpAnalysis),
    Trade(TradeAnalysis),
}

impl DomainAnalysis {
    /// Series used when correlating domains with each other
    pub fn headline_series(&self) -> Option<&TimeSeries> {
        match self {
            Self::Inflation(a) => a.inflation_rates.get(inflation::HEADLINE_RATE),
            Self::Gdp(a) => a.growth_rates.get(gdp::HEADLINE_GROWTH),
            Self::Trade(a) => a.growth_rates.get(trade::HEADLINE_GROWTH),
        }
    }
}

impl From<InflationAnalysis> for DomainAnalysis {
    fn from(analysis: InflationAnalysis) -> Self {
        Self::Inflation(analysis)
    }
}

impl From<GdpAnalysis> for DomainAnalysis {
    fn from(analysis: GdpAnalysis) -> Self {
        Self::Gdp(analysis)
    }
}

impl From<TradeAnalysis> for DomainAnalysis {
    fn from(analysis: TradeAnalysis) -> Self {
        Self::Trade(analysis)
    }
}

/// Complete result of one agent run
#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub agent_name: String,
    pub domain: Domain,
    pub analysis_period: DateRange,
    pub data_summary: BTreeMap<String, SummaryStats>,
    pub analysis: DomainAnalysis,
    pub insights: InsightBundle,
    pub charts: Vec<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub fetch_failures: Vec<FetchFailure>,
    pub timestamp: DateTime<Utc>,
}

/// Last run and cache size of an agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStatus {
    pub name: String,
    pub domain: Domain,
    pub last_analysis: Option<DateTime<Utc>>,
    pub cache_size: usize,
}

/// Build the agent for `domain` from configuration
pub fn build_agent(domain: Domain, config: &EconConfig, source: Arc<dyn DataSource>) -> Arc<dyn EconomicAgent> {
    let core = AgentCore::from_config(domain, config, source);
    match domain {
        Domain::Inflation => Arc::new(InflationAgent::new(core)),
        Domain::Gdp => Arc::new(GdpAgent::new(core)),
        Domain::Trade => Arc::new(TradeAgent::new(core)),
    }
}
