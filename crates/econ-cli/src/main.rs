//! Command-line interface for the economic analyzer

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use econ_agents::{AgentReport, ComprehensiveReport, DateRange, Domain, EconConfig, FredClient, Orchestrator};
use econ_utils::{LogConfig, init_tracing};
use tracing::{error, info};

/// Exit status when no usable FRED API key is configured
const EXIT_MISSING_KEY: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "econ-analyzer")]
#[command(about = "Multi-agent macroeconomic analysis over FRED data", long_about = None)]
struct Args {
    /// First date of the analysis window (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date of the analysis window (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Directory for reports and charts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Run a single domain (inflation, gdp or trade) instead of the full analysis
    #[arg(short, long)]
    domain: Option<Domain>,

    /// Skip writing chart specs
    #[arg(long)]
    no_charts: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn apply_overrides(config: &mut EconConfig, args: &Args) -> anyhow::Result<()> {
    let start = args.start.unwrap_or(config.date_range.start);
    let end = args.end.unwrap_or(config.date_range.end);
    config.date_range = DateRange::new(start, end)?;

    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
    if args.no_charts {
        config.write_charts = false;
    }

    config.validate()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_config = if args.log_json {
        LogConfig::from_env().json()
    } else {
        LogConfig::from_env()
    };
    init_tracing(&log_config);

    info!("Starting econ-analyzer");

    let mut config = EconConfig::from_env().context("failed to load configuration")?;
    apply_overrides(&mut config, &args)?;

    let api_key = match config.require_api_key() {
        Ok(key) => key.to_string(),
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Set FRED_API_KEY in the environment and try again.");
            std::process::exit(EXIT_MISSING_KEY);
        }
    };

    let client = FredClient::new(&api_key, config.rate_limit, config.request_timeout)?;
    let orchestrator = Orchestrator::new(&config, Arc::new(client));

    info!(
        "Analysis period: {} to {}",
        config.date_range.start, config.date_range.end
    );

    if let Some(domain) = args.domain {
        let report = orchestrator
            .run_individual(domain, &config.date_range)
            .await
            .inspect_err(|e| error!("{domain} analysis failed: {e}"))?;
        print_agent_report(&report);
    } else {
        let report = orchestrator.run_all(&config.date_range).await;
        print_comprehensive(&report);
        println!("\nReports written to {}", config.reports_dir().display());
    }

    Ok(())
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{title}:");
    for item in items {
        println!("  • {item}");
    }
}

fn print_agent_report(report: &AgentReport) {
    println!("\n{} ({} to {})", report.agent_name, report.analysis_period.start, report.analysis_period.end);

    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    for (key, value) in report.insights.summary.iter().filter(|(_, v)| !v.is_empty()) {
        table.add_row(vec![key, value]);
    }
    for (key, value) in &report.insights.assessment {
        table.add_row(vec![key.as_str(), value.as_str()]);
    }
    println!("{table}");

    print_list("Alerts", &report.insights.alerts);
    print_list("Observations", &report.insights.observations);

    if !report.fetch_failures.is_empty() {
        println!("\nUnavailable series: {}", report.fetch_failures.len());
    }
}

fn print_comprehensive(report: &ComprehensiveReport) {
    let summary = &report.summary;
    println!("\nCurrent Economic State: {}", summary.current_economic_state);

    let mut table = new_table();
    table.set_header(vec!["Domain", "Agent", "Alerts", "Observations", "Charts"]);
    for (domain, result) in &report.individual_results {
        table.add_row(vec![
            domain.title().to_string(),
            result.agent_name.clone(),
            result.insights.alerts.len().to_string(),
            result.insights.observations.len().to_string(),
            result.charts.len().to_string(),
        ]);
    }
    for failed in &report.analysis_metadata.failed_domains {
        table.add_row(vec![
            failed.domain.title().to_string(),
            "failed".to_string(),
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
        ]);
    }
    println!("{table}");

    print_list("Key Findings", &summary.key_findings);
    print_list("Major Risks", &summary.major_risks);
    print_list("Opportunities", &summary.opportunities);
    print_list("Recommendations", &summary.recommendations);

    println!(
        "\nOverall Risk Level: {}",
        report.combined_insights.risk_assessment.overall_risk_level
    );
}
