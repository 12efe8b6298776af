//! Human-readable rendering of a [`ComprehensiveReport`]

use crate::insights::readable_key;
use crate::orchestrator::ComprehensiveReport;

const TOP_OBSERVATIONS: usize = 5;

fn heading(out: &mut String, title: &str, underline: char) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&underline.to_string().repeat(title.chars().count()));
    out.push('\n');
}

fn bullets(out: &mut String, title: &str, items: &[String]) {
    heading(out, title, '-');
    for item in items {
        out.push_str(&format!("• {item}\n"));
    }
    out.push('\n');
}

pub fn render_summary(report: &ComprehensiveReport) -> String {
    let mut out = String::new();
    let meta = &report.analysis_metadata;
    let summary = &report.summary;
    let combined = &report.combined_insights;

    heading(&mut out, "ECONOMIC ANALYSIS SUMMARY REPORT", '=');
    out.push('\n');

    out.push_str(&format!("Analysis Period: {} to {}\n", meta.start_date, meta.end_date));
    out.push_str(&format!("Analysis Date: {}\n", meta.analysis_timestamp.format("%Y-%m-%d")));
    let used: Vec<&str> = meta.agents_used.iter().map(|d| d.key()).collect();
    out.push_str(&format!("Agents Used: {}\n", used.join(", ")));
    for failed in &meta.failed_domains {
        out.push_str(&format!("Failed: {} ({})\n", failed.domain, failed.reason));
    }
    out.push('\n');

    heading(&mut out, "EXECUTIVE SUMMARY", '-');
    out.push_str(&format!("Current Economic State: {}\n\n", summary.current_economic_state));

    bullets(&mut out, "KEY FINDINGS", &summary.key_findings);
    bullets(&mut out, "MAJOR RISKS", &summary.major_risks);
    bullets(&mut out, "OPPORTUNITIES", &summary.opportunities);
    bullets(&mut out, "RECOMMENDATIONS", &summary.recommendations);

    let overview = &combined.economic_overview;
    heading(&mut out, "ECONOMIC OVERVIEW", '-');
    for (label, value) in [
        ("Current State", &overview.current_state),
        ("Growth Momentum", &overview.growth_momentum),
        ("Inflation Pressure", &overview.inflation_pressure),
        ("External Balance", &overview.external_balance),
        ("Overall Assessment", &overview.overall_assessment),
    ] {
        out.push_str(&format!("{label}: {value}\n"));
    }
    out.push('\n');

    if !combined.cross_correlations.insights.is_empty() || !combined.cross_correlations.themes.is_empty() {
        let mut lines = combined.cross_correlations.insights.clone();
        lines.extend(combined.cross_correlations.themes.iter().map(|t| format!("Theme: {t}")));
        bullets(&mut out, "CROSS-DOMAIN SIGNALS", &lines);
    }

    heading(&mut out, "RISK ASSESSMENT", '-');
    out.push_str(&format!(
        "Overall Risk Level: {}\n\n",
        combined.risk_assessment.overall_risk_level
    ));

    heading(&mut out, "DETAILED AGENT ANALYSIS", '=');
    out.push('\n');

    for (domain, result) in &report.individual_results {
        let insights = &result.insights;
        heading(&mut out, &format!("{} ANALYSIS", domain.key().to_uppercase()), '-');

        if !insights.summary.is_empty() {
            out.push_str("Summary:\n");
            for (key, value) in insights.summary.iter().filter(|(_, v)| !v.is_empty()) {
                out.push_str(&format!("  {}: {value}\n", readable_key(key)));
            }
            out.push('\n');
        }

        if !insights.alerts.is_empty() {
            out.push_str("Alerts:\n");
            for alert in &insights.alerts {
                out.push_str(&format!("  ⚠ {alert}\n"));
            }
            out.push('\n');
        }

        if !insights.observations.is_empty() {
            out.push_str("Key Observations:\n");
            for obs in insights.observations.iter().take(TOP_OBSERVATIONS) {
                out.push_str(&format!("  • {obs}\n"));
            }
            out.push('\n');
        }

        out.push('\n');
    }

    out
}
