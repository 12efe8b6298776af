//! Coordinates the domain agents and builds the comprehensive report

pub mod synthesis;

pub use synthesis::{CombinedInsights, ExecutiveSummary, SynthesisSettings};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;

use crate::agents::{AgentReport, AgentStatus, EconomicAgent, build_agent};
use crate::api::DataSource;
use crate::config::{DateRange, EconConfig};
use crate::domain::Domain;
use crate::error::{EconError, Result};
use crate::report::ReportWriter;

/// A domain excluded from an orchestrated run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDomain {
    pub domain: Domain,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub analysis_timestamp: DateTime<Utc>,
    pub agents_used: Vec<Domain>,
    pub failed_domains: Vec<FailedDomain>,
}

/// Everything produced by one orchestrated run
#[derive(Debug, Clone, Serialize)]
pub struct ComprehensiveReport {
    pub analysis_metadata: AnalysisMetadata,
    pub individual_results: BTreeMap<Domain, AgentReport>,
    pub combined_insights: CombinedInsights,
    pub summary: ExecutiveSummary,
}

/// Runs the domain agents and synthesizes their results
pub struct Orchestrator {
    agents: BTreeMap<Domain, Arc<dyn EconomicAgent>>,
    synthesis: SynthesisSettings,
    writer: Option<ReportWriter>,
}

impl Orchestrator {
    /// One agent per domain, reports written under `<output>/reports`
    pub fn new(config: &EconConfig, source: Arc<dyn DataSource>) -> Self {
        let agents: Vec<_> = Domain::ALL
            .into_iter()
            .map(|domain| build_agent(domain, config, Arc::clone(&source)))
            .collect();
        tracing::info!("All agents initialized successfully");

        Self::from_agents(
            agents,
            SynthesisSettings {
                correlation_threshold: config.correlation_threshold,
                min_observations: config.min_correlation_observations,
            },
        )
        .with_report_writer(ReportWriter::new(config.reports_dir()))
    }

    /// Build from prepared agents; no reports are written
    pub fn from_agents<I>(agents: I, synthesis: SynthesisSettings) -> Self
    where
        I: IntoIterator<Item = Arc<dyn EconomicAgent>>,
    {
        Self {
            agents: agents.into_iter().map(|a| (a.domain(), a)).collect(),
            synthesis,
            writer: None,
        }
    }

    pub fn with_report_writer(mut self, writer: ReportWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn domains(&self) -> Vec<Domain> {
        self.agents.keys().copied().collect()
    }

    /// Run a single agent and persist its result
    pub async fn run_individual(&self, domain: Domain, range: &DateRange) -> Result<AgentReport> {
        let agent = self
            .agents
            .get(&domain)
            .ok_or_else(|| EconError::UnknownDomain(domain.to_string()))?;
        self.run_agent(agent.as_ref(), range).await
    }

    async fn run_agent(&self, agent: &dyn EconomicAgent, range: &DateRange) -> Result<AgentReport> {
        tracing::info!("Running {} analysis from {} to {}", agent.domain(), range.start, range.end);
        let report = agent.run_analysis(range).await?;
        if let Some(writer) = &self.writer {
            if let Err(e) = writer.write_agent_report(&report) {
                tracing::error!("Error saving {} results: {e}", agent.domain());
            }
        }
        Ok(report)
    }

    /// Run every agent concurrently and synthesize the results
    ///
    /// Failing domains are logged and listed in the metadata; this never
    /// fails as a whole.
    pub async fn run_all(&self, range: &DateRange) -> ComprehensiveReport {
        tracing::info!("Running comprehensive economic analysis from {} to {}", range.start, range.end);

        let outcomes = join_all(self.agents.iter().map(|(domain, agent)| async move {
            (*domain, self.run_agent(agent.as_ref(), range).await)
        }))
        .await;

        let mut individual_results = BTreeMap::new();
        let mut failed_domains = Vec::new();
        for (domain, outcome) in outcomes {
            match outcome {
                Ok(report) => {
                    individual_results.insert(domain, report);
                }
                Err(e) => {
                    tracing::error!("Failed to run {domain} analysis: {e}");
                    failed_domains.push(FailedDomain {
                        domain,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let combined_insights = synthesis::combine(&individual_results, self.synthesis);
        let summary = synthesis::executive_summary(&individual_results, &combined_insights);

        let report = ComprehensiveReport {
            analysis_metadata: AnalysisMetadata {
                start_date: range.start,
                end_date: range.end,
                analysis_timestamp: Utc::now(),
                agents_used: individual_results.keys().copied().collect(),
                failed_domains,
            },
            individual_results,
            combined_insights,
            summary,
        };

        if let Some(writer) = &self.writer {
            if let Err(e) = writer.write_comprehensive(&report) {
                tracing::error!("Error saving comprehensive report: {e}");
            }
        }

        report
    }

    pub async fn agent_status(&self) -> BTreeMap<Domain, AgentStatus> {
        let statuses = join_all(self.agents.values().map(|agent| agent.status())).await;
        statuses.into_iter().map(|s| (s.domain, s)).collect()
    }

    pub async fn clear_cache(&self) {
        for agent in self.agents.values() {
            agent.clear_cache().await;
        }
        tracing::info!("Cleared cache for all agents");
    }
}
