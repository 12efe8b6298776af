//! Cross-domain synthesis of agent reports
//!
//! Everything here reads finished [`AgentReport`]s only; no data is fetched.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::agents::AgentReport;
use crate::domain::Domain;
use crate::insights::{InsightBundle, RiskLevel, keys, readable_key};
use crate::metrics::correlation;

const UNKNOWN: &str = "Unknown";

/// Keywords marking an observation as a risk mitigation factor
const MITIGATION_KEYWORDS: [&str; 5] = ["strong", "improving", "growth", "positive", "above average"];
/// Keywords marking an observation as an opportunity
const OPPORTUNITY_KEYWORDS: [&str; 6] = ["strong", "improving", "growth", "positive", "above", "advantage"];

const KEY_FINDINGS_PER_DOMAIN: usize = 3;
const MAJOR_RISKS: usize = 5;
const OPPORTUNITIES_PER_DOMAIN: usize = 2;

/// Domain pairs whose headline series are correlated
const CORRELATED_PAIRS: [(Domain, Domain); 3] = [
    (Domain::Inflation, Domain::Gdp),
    (Domain::Trade, Domain::Gdp),
    (Domain::Inflation, Domain::Trade),
];

/// Thresholds used while synthesizing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisSettings {
    /// Minimum |r| for a correlation insight
    pub correlation_threshold: f64,
    /// Minimum overlapping observations for a coefficient to be reported
    pub min_observations: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            correlation_threshold: 0.7,
            min_observations: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EconomicOverview {
    pub current_state: String,
    pub growth_momentum: String,
    pub inflation_pressure: String,
    pub external_balance: String,
    pub overall_assessment: String,
}

/// Pearson correlation between two domains' headline series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainCorrelation {
    pub first: Domain,
    pub second: Domain,
    /// Absent when either domain is missing or the overlap is too short
    pub coefficient: Option<f64>,
    pub observations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossCorrelations {
    pub pairs: Vec<DomainCorrelation>,
    /// Pairs whose coefficient clears the threshold
    pub insights: Vec<String>,
    /// Keyword-matched themes across all alerts and observations
    pub themes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub overall_risk_level: RiskLevel,
    pub risk_score: i64,
    pub risk_factors: Vec<String>,
    pub risk_mitigation_factors: Vec<String>,
    pub key_risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedInsights {
    pub economic_overview: EconomicOverview,
    pub cross_correlations: CrossCorrelations,
    pub policy_implications: Vec<String>,
    pub risk_assessment: RiskAssessment,
    pub forecasting_signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutiveSummary {
    pub current_economic_state: String,
    pub key_findings: Vec<String>,
    pub major_risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Synthesize insights across every successful domain
pub fn combine(results: &BTreeMap<Domain, AgentReport>, settings: SynthesisSettings) -> CombinedInsights {
    tracing::info!("Generating combined cross-agent insights...");
    CombinedInsights {
        economic_overview: economic_overview(results),
        cross_correlations: cross_correlations(results, settings),
        policy_implications: policy_implications(results),
        risk_assessment: risk_assessment(results),
        forecasting_signals: forecasting_signals(results),
    }
}

fn insights_for(results: &BTreeMap<Domain, AgentReport>, domain: Domain) -> Option<&InsightBundle> {
    results.get(&domain).map(|r| &r.insights)
}

fn assessment_of(results: &BTreeMap<Domain, AgentReport>, domain: Domain, key: &str) -> Option<String> {
    insights_for(results, domain)
        .and_then(|i| i.assessment(key))
        .map(str::to_string)
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

pub fn economic_overview(results: &BTreeMap<Domain, AgentReport>) -> EconomicOverview {
    let unknown = || UNKNOWN.to_string();
    let current_state = assessment_of(results, Domain::Gdp, keys::GROWTH_STATUS).unwrap_or_else(unknown);

    let overall_assessment = if current_state.contains("Contraction") {
        "Economic Weakness"
    } else if current_state.contains("Strong Growth") {
        "Economic Strength"
    } else if current_state.contains("Moderate Growth") {
        "Stable Growth"
    } else {
        "Mixed Signals"
    };

    EconomicOverview {
        growth_momentum: assessment_of(results, Domain::Gdp, keys::BUSINESS_CYCLE_PHASE).unwrap_or_else(unknown),
        inflation_pressure: insights_for(results, Domain::Inflation)
            .and_then(|i| i.summary.get(keys::CURRENT_HEADLINE_INFLATION))
            .map_or_else(unknown, str::to_string),
        external_balance: assessment_of(results, Domain::Trade, keys::BALANCE_STATUS).unwrap_or_else(unknown),
        overall_assessment: overall_assessment.to_string(),
        current_state,
    }
}

pub fn cross_correlations(results: &BTreeMap<Domain, AgentReport>, settings: SynthesisSettings) -> CrossCorrelations {
    let mut correlations = CrossCorrelations::default();

    for (first, second) in CORRELATED_PAIRS {
        let headline = |d: Domain| results.get(&d).and_then(|r| r.analysis.headline_series());
        let measured = match (headline(first), headline(second)) {
            (Some(a), Some(b)) => correlation(a, b),
            _ => None,
        };

        let (coefficient, observations) = match measured {
            Some((r, n)) if n >= settings.min_observations => (Some(r), n),
            Some((_, n)) => {
                tracing::debug!("Skipping {first}/{second} correlation: only {n} overlapping observations");
                (None, n)
            }
            None => (None, 0),
        };

        if let Some(r) = coefficient.filter(|r| r.abs() >= settings.correlation_threshold) {
            let direction = if r > 0.0 { "positive" } else { "negative" };
            correlations.insights.push(format!(
                "Strong {direction} correlation between {} and {} (r = {r:.2} over {observations} observations)",
                first.title(),
                second.title()
            ));
        }

        correlations.pairs.push(DomainCorrelation {
            first,
            second,
            coefficient,
            observations,
        });
    }

    let messages: Vec<String> = results
        .values()
        .flat_map(|r| r.insights.observations.iter().chain(r.insights.alerts.iter()))
        .map(|m| m.to_lowercase())
        .collect();
    let any = |words: &[&str]| messages.iter().any(|m| words.iter().any(|w| m.contains(w)));

    if any(&["growth"]) {
        correlations
            .themes
            .push("Growth concerns appear across multiple indicators".to_string());
    }
    if any(&["inflation", "price"]) {
        correlations
            .themes
            .push("Price pressures evident in multiple sectors".to_string());
    }
    if any(&["volatility"]) {
        correlations
            .themes
            .push("High volatility observed across economic indicators".to_string());
    }

    correlations
}

pub fn risk_assessment(results: &BTreeMap<Domain, AgentReport>) -> RiskAssessment {
    let mut risk_factors = Vec::new();
    let mut risk_mitigation_factors = Vec::new();

    for (domain, report) in results {
        risk_factors.extend(
            report
                .insights
                .alerts
                .iter()
                .map(|alert| format!("{}: {alert}", domain.title())),
        );
        risk_mitigation_factors.extend(
            report
                .insights
                .observations
                .iter()
                .filter(|obs| contains_any(obs, &MITIGATION_KEYWORDS))
                .map(|obs| format!("{}: {obs}", domain.title())),
        );
    }

    let risk_score = risk_factors.len() as i64 - risk_mitigation_factors.len() as i64;

    let mut key_risks = Vec::new();
    if let Some(risk) = assessment_of(results, Domain::Gdp, keys::RECESSION_RISK) {
        if risk == "High" || risk == "Very High" {
            key_risks.push(format!("Recession risk: {risk}"));
        }
    }

    RiskAssessment {
        overall_risk_level: RiskLevel::from_score(risk_score),
        risk_score,
        risk_factors,
        risk_mitigation_factors,
        key_risks,
    }
}

pub fn policy_implications(results: &BTreeMap<Domain, AgentReport>) -> Vec<String> {
    let mut implications = Vec::new();

    if let Some(distance) =
        insights_for(results, Domain::Inflation).and_then(|i| i.summary.get(keys::DISTANCE_FROM_FED_TARGET))
    {
        if distance.contains('+') {
            implications.push("Monetary Policy: Consider tighter policy to combat inflation".to_string());
        } else if distance.contains('-') {
            implications.push("Monetary Policy: Consider accommodative policy to boost inflation".to_string());
        }
    }

    if let Some(status) = assessment_of(results, Domain::Gdp, keys::GROWTH_STATUS) {
        if status.contains("Contraction") {
            implications.push("Fiscal Policy: Consider stimulus measures to support growth".to_string());
        } else if status.contains("Strong Growth") {
            implications.push("Fiscal Policy: Consider measured approach to avoid overheating".to_string());
        }
    }

    if assessment_of(results, Domain::Trade, keys::BALANCE_STATUS).is_some_and(|s| s.contains("Deficit")) {
        implications.push("Trade Policy: Monitor trade deficit and competitiveness".to_string());
    }

    implications
}

pub fn forecasting_signals(results: &BTreeMap<Domain, AgentReport>) -> Vec<String> {
    let mut signals = Vec::new();

    if let Some(phase) = assessment_of(results, Domain::Gdp, keys::BUSINESS_CYCLE_PHASE) {
        signals.push(format!("Business Cycle: Currently in {phase} phase"));
    }

    if let Some(insights) = insights_for(results, Domain::Inflation) {
        signals.extend(
            insights
                .observations
                .iter()
                .filter(|obs| contains_any(obs, &["trend", "increasing", "decreasing"]))
                .map(|obs| format!("Inflation Signal: {obs}")),
        );
    }

    if let Some(insights) = insights_for(results, Domain::Trade) {
        signals.extend(
            insights
                .observations
                .iter()
                .filter(|obs| contains_any(obs, &["competitiveness", "terms of trade"]))
                .map(|obs| format!("Trade Signal: {obs}")),
        );
    }

    signals
}

pub fn executive_summary(results: &BTreeMap<Domain, AgentReport>, combined: &CombinedInsights) -> ExecutiveSummary {
    let key_findings = results
        .iter()
        .filter_map(|(domain, report)| {
            let findings: Vec<String> = report
                .insights
                .summary
                .iter()
                .filter(|(_, value)| !value.is_empty() && *value != UNKNOWN)
                .take(KEY_FINDINGS_PER_DOMAIN)
                .map(|(key, value)| format!("{}: {value}", readable_key(key)))
                .collect();
            (!findings.is_empty()).then(|| format!("{} - {}", domain.title(), findings.join("; ")))
        })
        .collect();

    let opportunities = results
        .values()
        .flat_map(|report| {
            report
                .insights
                .observations
                .iter()
                .filter(|obs| contains_any(obs, &OPPORTUNITY_KEYWORDS))
                .take(OPPORTUNITIES_PER_DOMAIN)
                .cloned()
        })
        .collect();

    ExecutiveSummary {
        current_economic_state: combined.economic_overview.overall_assessment.clone(),
        key_findings,
        major_risks: combined
            .risk_assessment
            .risk_factors
            .iter()
            .take(MAJOR_RISKS)
            .cloned()
            .collect(),
        opportunities,
        recommendations: combined.policy_implications.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{DomainAnalysis, GdpAnalysis, InflationAnalysis, TradeAnalysis, gdp, inflation};
    use crate::config::DateRange;
    use crate::series::TimeSeries;
    use crate::series::test_support::*;
    use chrono::Utc;

    fn report(domain: Domain, analysis: DomainAnalysis, insights: InsightBundle) -> AgentReport {
        AgentReport {
            agent_name: domain.agent_name().to_string(),
            domain,
            analysis_period: DateRange::new(date(2015, 1, 1), date(2024, 12, 31)).unwrap(),
            data_summary: BTreeMap::new(),
            analysis,
            insights,
            charts: Vec::new(),
            data_file: None,
            fetch_failures: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    fn gdp_insights(status: &str, phase: &str, risk: &str) -> InsightBundle {
        let mut insights = InsightBundle::default();
        insights.assess(keys::GROWTH_STATUS, status);
        insights.assess(keys::BUSINESS_CYCLE_PHASE, phase);
        insights.assess(keys::RECESSION_RISK, risk);
        insights
    }

    fn inflation_insights(headline: &str, distance: &str) -> InsightBundle {
        let mut insights = InsightBundle::default();
        insights.summary.insert(keys::CURRENT_HEADLINE_INFLATION, headline);
        insights.summary.insert(keys::DISTANCE_FROM_FED_TARGET, distance);
        insights
    }

    fn gdp_report(insights: InsightBundle, growth: TimeSeries) -> AgentReport {
        let analysis = GdpAnalysis {
            growth_rates: BTreeMap::from([(gdp::HEADLINE_GROWTH.to_string(), growth)]),
            ..Default::default()
        };
        report(Domain::Gdp, analysis.into(), insights)
    }

    fn inflation_report(insights: InsightBundle, rate: TimeSeries) -> AgentReport {
        let analysis = InflationAnalysis {
            inflation_rates: BTreeMap::from([(inflation::HEADLINE_RATE.to_string(), rate)]),
            ..Default::default()
        };
        report(Domain::Inflation, analysis.into(), insights)
    }

    #[test]
    fn test_overview_and_policy() {
        let results = BTreeMap::from([
            (
                Domain::Gdp,
                gdp_report(gdp_insights("Contraction", "Contraction", "Very High"), TimeSeries::empty()),
            ),
            (
                Domain::Inflation,
                inflation_report(inflation_insights("4.10%", "+1.80 percentage points"), TimeSeries::empty()),
            ),
        ]);

        let overview = economic_overview(&results);
        assert_eq!(overview.current_state, "Contraction");
        assert_eq!(overview.growth_momentum, "Contraction");
        assert_eq!(overview.inflation_pressure, "4.10%");
        assert_eq!(overview.external_balance, "Unknown");
        assert_eq!(overview.overall_assessment, "Economic Weakness");

        assert_eq!(
            policy_implications(&results),
            vec![
                "Monetary Policy: Consider tighter policy to combat inflation".to_string(),
                "Fiscal Policy: Consider stimulus measures to support growth".to_string(),
            ]
        );
        assert_eq!(
            forecasting_signals(&results),
            vec!["Business Cycle: Currently in Contraction phase".to_string()]
        );
        assert_eq!(risk_assessment(&results).key_risks, vec!["Recession risk: Very High".to_string()]);
    }

    #[test]
    fn test_very_strong_growth_counts_as_strength() {
        let results = BTreeMap::from([(
            Domain::Gdp,
            gdp_report(gdp_insights("Very Strong Growth", "Expansion", "Very Low"), TimeSeries::empty()),
        )]);
        assert_eq!(economic_overview(&results).overall_assessment, "Economic Strength");
        assert!(risk_assessment(&results).key_risks.is_empty());
    }

    #[test]
    fn test_risk_score_and_levels() {
        let mut trade = InsightBundle::default();
        trade.alert("Large trade deficit: $70.0B");
        trade.alert("Sharp export decline: -7.5% year-over-year");
        trade.alert("Rapid import growth: 16.0% year-over-year");
        trade.observe("Strong export growth: 12.0% year-over-year");
        trade.observe("Trade surplus of $3.0B");

        let results = BTreeMap::from([(Domain::Trade, report(Domain::Trade, TradeAnalysis::default().into(), trade))]);
        let risk = risk_assessment(&results);

        assert_eq!(risk.risk_score, 2);
        assert_eq!(risk.overall_risk_level, RiskLevel::MediumHigh);
        assert_eq!(risk.risk_factors[0], "Trade: Large trade deficit: $70.0B");
        assert_eq!(risk.risk_mitigation_factors.len(), 1);
    }

    #[test]
    fn test_headline_correlation() {
        let base: Vec<f64> = (0..12).map(|i| f64::from(i) * 0.5).collect();
        let gdp_growth = quarterly(2020, &base);
        // Monthly inflation sharing the quarterly dates, perfectly correlated
        let monthly_values: Vec<Option<f64>> = (0..36)
            .map(|i| (i % 3 == 0).then(|| f64::from(i / 3) + 1.0))
            .collect();
        let cpi = monthly_opt(2020, &monthly_values);

        let results = BTreeMap::from([
            (Domain::Gdp, gdp_report(InsightBundle::default(), gdp_growth)),
            (Domain::Inflation, inflation_report(InsightBundle::default(), cpi)),
        ]);

        let correlations = cross_correlations(&results, SynthesisSettings::default());
        let pair = &correlations.pairs[0];
        assert_eq!((pair.first, pair.second), (Domain::Inflation, Domain::Gdp));
        assert_eq!(pair.observations, 12);
        assert!((pair.coefficient.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(correlations.insights.len(), 1);
        assert!(correlations.insights[0].starts_with("Strong positive correlation between Inflation and Gdp"));

        // Trade is missing from both remaining pairs
        assert!(correlations.pairs[1].coefficient.is_none());
        assert!(correlations.pairs[2].coefficient.is_none());
    }

    #[test]
    fn test_short_overlap_is_not_reported() {
        let results = BTreeMap::from([
            (Domain::Gdp, gdp_report(InsightBundle::default(), quarterly(2020, &[1.0, 2.0, 3.0]))),
            (Domain::Inflation, inflation_report(InsightBundle::default(), quarterly(2020, &[2.0, 4.0, 6.0]))),
        ]);
        let correlations = cross_correlations(&results, SynthesisSettings::default());
        assert!(correlations.pairs[0].coefficient.is_none());
        assert_eq!(correlations.pairs[0].observations, 3);
        assert!(correlations.insights.is_empty());
    }

    #[test]
    fn test_themes() {
        let mut inflation = InsightBundle::default();
        inflation.observe("Cpi All shows high volatility (coefficient of variation: 0.75)");
        let results = BTreeMap::from([(
            Domain::Inflation,
            inflation_report(inflation, TimeSeries::empty()),
        )]);

        let themes = cross_correlations(&results, SynthesisSettings::default()).themes;
        assert_eq!(themes, vec!["High volatility observed across economic indicators".to_string()]);
    }

    #[test]
    fn test_executive_summary() {
        let mut gdp = gdp_insights("Moderate Growth", "Expansion", "Low");
        gdp.summary.insert("current_gdp_growth", "2.20%");
        gdp.summary.insert("historical_average_growth", "2.00%");
        gdp.summary.insert("growth_vs_historical", "+0.20 pp vs historical average");
        gdp.summary.insert("cycle_phase_duration", "6 quarters");
        gdp.observe("Strong signal one");
        gdp.observe("Improving signal two");
        gdp.observe("Growth signal three");

        let results = BTreeMap::from([(Domain::Gdp, gdp_report(gdp, TimeSeries::empty()))]);
        let combined = combine(&results, SynthesisSettings::default());
        let summary = executive_summary(&results, &combined);

        assert_eq!(summary.current_economic_state, "Stable Growth");
        assert_eq!(
            summary.key_findings,
            vec![
                "Gdp - Current Gdp Growth: 2.20%; Historical Average Growth: 2.00%; Growth Vs Historical: +0.20 pp vs historical average"
                    .to_string()
            ]
        );
        assert_eq!(summary.opportunities.len(), 2);
        assert!(summary.major_risks.is_empty());
    }
}
