use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::summary::render_summary;
use crate::agents::AgentReport;
use crate::error::Result;
use crate::orchestrator::ComprehensiveReport;

/// Files produced for one comprehensive report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub json: PathBuf,
    pub summary: PathBuf,
}

/// Writes reports under a single directory
///
/// Per agent: `<domain>_analysis_results.json`. Per run:
/// `comprehensive_economic_analysis_<ts>.json` and
/// `economic_analysis_summary_<ts>.txt`, where `<ts>` is the run timestamp
/// as `%Y%m%d_%H%M%S`.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_agent_report(&self, report: &AgentReport) -> Result<PathBuf> {
        let path = self.write_json(&format!("{}_analysis_results.json", report.domain.key()), report)?;
        tracing::info!("Saved {} results to {}", report.domain, path.display());
        Ok(path)
    }

    pub fn write_comprehensive(&self, report: &ComprehensiveReport) -> Result<ReportFiles> {
        let timestamp = report
            .analysis_metadata
            .analysis_timestamp
            .format("%Y%m%d_%H%M%S")
            .to_string();

        let json = self.write_json(&format!("comprehensive_economic_analysis_{timestamp}.json"), report)?;
        tracing::info!("Saved comprehensive report to {}", json.display());

        let summary = self.dir.join(format!("economic_analysis_summary_{timestamp}.txt"));
        fs::write(&summary, render_summary(report))?;
        tracing::info!("Saved readable summary to {}", summary.display());

        Ok(ReportFiles { json, summary })
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }
}
