//! Inflation insight rules

use super::{InsightBundle, keys, readable_name};
use crate::agents::inflation::{CORE_RATE, FED_TARGET, HEADLINE_RATE, InflationAnalysis, PCE_RATE};

/// Headline above this multiple of its all-time average raises an alert
const HIGH_INFLATION_MULTIPLE: f64 = 1.5;
/// Allowed PCE distance from the Fed target, in percentage points
const TARGET_TOLERANCE: f64 = 1.0;
const TREND_MAGNITUDE: f64 = 0.5;
const HIGH_VOLATILITY_CV: f64 = 0.5;
const CORE_GAP: f64 = 1.0;

pub fn generate(analysis: &InflationAnalysis) -> InsightBundle {
    tracing::info!("Generating inflation insights...");
    let mut insights = InsightBundle::default();

    if let Some(current) = analysis.current(HEADLINE_RATE) {
        insights
            .summary
            .insert(keys::CURRENT_HEADLINE_INFLATION, format!("{current:.2}%"));

        if let Some(avg) = analysis.historical_averages.get(HEADLINE_RATE).map(|h| h.all_time) {
            if current > avg * HIGH_INFLATION_MULTIPLE {
                insights.alert(format!(
                    "High inflation alert: Current CPI inflation ({current:.2}%) is significantly above historical average ({avg:.2}%)"
                ));
            }
        }
        if current < 0.0 {
            insights.alert(format!(
                "Deflation alert: Current CPI inflation is negative ({current:.2}%)"
            ));
        }
    }

    if let Some(core) = analysis.current(CORE_RATE) {
        insights
            .summary
            .insert("current_core_inflation", format!("{core:.2}%"));
    }

    // The Fed targets PCE inflation
    if let Some(pce) = analysis.current(PCE_RATE) {
        let distance = pce - FED_TARGET;
        insights.summary.insert(
            keys::DISTANCE_FROM_FED_TARGET,
            format!("{distance:+.2} percentage points"),
        );
        if distance.abs() > TARGET_TOLERANCE {
            insights.alert(format!(
                "Fed target deviation: PCE inflation ({pce:.2}%) is {:.2} percentage points away from Fed's 2% target",
                distance.abs()
            ));
        }
    }

    for (name, trend) in &analysis.trends {
        if trend.magnitude > TREND_MAGNITUDE {
            insights.observe(format!(
                "{} is {} with magnitude of {:.2} percentage points",
                readable_name(name),
                trend.direction,
                trend.magnitude
            ));
        }
    }

    for (name, vol) in &analysis.volatility {
        if let Some(cv) = vol.coefficient_variation.filter(|cv| *cv > HIGH_VOLATILITY_CV) {
            insights.observe(format!(
                "{} shows high volatility (coefficient of variation: {cv:.2})",
                readable_name(name)
            ));
        }
    }

    if let Some(cmp) = &analysis.core_vs_headline {
        let diff = cmp.current_difference;
        if diff > CORE_GAP {
            insights.observe(format!(
                "Headline inflation is {diff:.2} percentage points above core inflation, suggesting food/energy price pressures"
            ));
        } else if diff < -CORE_GAP {
            insights.observe(format!(
                "Core inflation is {:.2} percentage points above headline inflation, suggesting underlying price pressures",
                diff.abs()
            ));
        }
    }

    insights
}
