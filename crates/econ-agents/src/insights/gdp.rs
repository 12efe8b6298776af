//! GDP insight rules

use std::fmt;

use serde::Serialize;

use super::{InsightBundle, RecessionRisk, keys};
use crate::agents::gdp::{CyclePhase, GdpAnalysis, HEADLINE_GROWTH, REAL_QOQ, RECESSION_RUN};

/// Deviation from the historical average worth mentioning, in percentage points
const NOTABLE_DEVIATION: f64 = 2.0;
const EXTENDED_EXPANSION_MULTIPLE: f64 = 1.5;
const PRODUCTIVITY_SHIFT: f64 = 0.5;
const HIGH_DEFLATOR_GROWTH: f64 = 4.0;

/// Exclusive growth bands for real GDP YoY growth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrowthStatus {
    Contraction,
    SlowGrowth,
    ModerateGrowth,
    StrongGrowth,
    VeryStrongGrowth,
}

impl GrowthStatus {
    pub fn classify(growth: f64) -> Self {
        if growth < 0.0 {
            Self::Contraction
        } else if growth < 1.0 {
            Self::SlowGrowth
        } else if growth < 3.0 {
            Self::ModerateGrowth
        } else if growth < 5.0 {
            Self::StrongGrowth
        } else {
            Self::VeryStrongGrowth
        }
    }
}

impl fmt::Display for GrowthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Contraction => "Contraction",
            Self::SlowGrowth => "Slow Growth",
            Self::ModerateGrowth => "Moderate Growth",
            Self::StrongGrowth => "Strong Growth",
            Self::VeryStrongGrowth => "Very Strong Growth",
        })
    }
}

pub fn generate(analysis: &GdpAnalysis) -> InsightBundle {
    tracing::info!("Generating GDP insights...");
    let mut insights = InsightBundle::default();
    let current_growth = analysis.current(HEADLINE_GROWTH);

    if let Some(growth) = current_growth {
        insights.summary.insert("current_gdp_growth", format!("{growth:.2}%"));

        let status = GrowthStatus::classify(growth);
        insights.assess(keys::GROWTH_STATUS, status);
        match status {
            GrowthStatus::Contraction => {
                insights.alert(format!("Economic contraction: GDP declining at {growth:.2}% annual rate"));
            }
            GrowthStatus::SlowGrowth => {
                insights.observe(format!("Slow economic growth: GDP growing at {growth:.2}% annual rate"));
            }
            GrowthStatus::VeryStrongGrowth => {
                insights.observe(format!("Exceptionally strong growth: GDP growing at {growth:.2}% annual rate"));
            }
            GrowthStatus::ModerateGrowth | GrowthStatus::StrongGrowth => {}
        }
    }

    if let Some(history) = analysis.historical_analysis.get(HEADLINE_GROWTH) {
        let avg = history.average_growth;
        insights.summary.insert("historical_average_growth", format!("{avg:.2}%"));

        if let Some(growth) = current_growth {
            let deviation = growth - avg;
            insights.summary.insert(
                "growth_vs_historical",
                format!("{deviation:+.2} pp vs historical average"),
            );
            if deviation > NOTABLE_DEVIATION {
                insights.observe(format!(
                    "Growth significantly above historical average (+{deviation:.2} percentage points)"
                ));
            } else if deviation < -NOTABLE_DEVIATION {
                insights.observe(format!(
                    "Growth significantly below historical average ({deviation:.2} percentage points)"
                ));
            }
        }
    }

    if let Some(cycle) = &analysis.business_cycle {
        let duration = cycle.phase_duration;
        insights.assess(keys::BUSINESS_CYCLE_PHASE, cycle.current_phase);
        insights.summary.insert("cycle_phase_duration", format!("{duration} quarters"));

        match cycle.current_phase {
            CyclePhase::Contraction => {
                insights.alert(format!("Economy in contraction phase for {duration} quarters"));
                if duration >= RECESSION_RUN {
                    insights.alert("Technical recession: 2+ consecutive quarters of negative growth");
                }
            }
            CyclePhase::Expansion => {
                let average = cycle.average_expansion_length.unwrap_or(0.0);
                if duration as f64 > average * EXTENDED_EXPANSION_MULTIPLE {
                    insights.observe(format!(
                        "Extended expansion: Current expansion ({duration} quarters) is longer than historical average"
                    ));
                }
            }
        }
    }

    if let Some(productivity) = &analysis.productivity_analysis {
        let avg = productivity.average_productivity_growth;
        let recent = productivity.recent_productivity_trend;
        insights
            .summary
            .insert("average_productivity_growth", format!("{avg:.2}%"));

        let change = recent - avg;
        if change > PRODUCTIVITY_SHIFT {
            insights.observe(format!(
                "Improving productivity: Recent trend ({recent:.2}%) above historical average"
            ));
        } else if change < -PRODUCTIVITY_SHIFT {
            insights.observe(format!(
                "Declining productivity: Recent trend ({recent:.2}%) below historical average"
            ));
        }
    }

    insights.assess(keys::RECESSION_RISK, recession_risk(analysis));

    if let Some(percentile) = analysis
        .strength_indicators
        .as_ref()
        .and_then(|s| s.growth_percentile)
    {
        if percentile > 75.0 {
            insights.observe(format!(
                "Growth in top quartile of historical distribution ({percentile:.0}th percentile)"
            ));
        } else if percentile < 25.0 {
            insights.observe(format!(
                "Growth in bottom quartile of historical distribution ({percentile:.0}th percentile)"
            ));
        }
    }

    if let Some(deflator_growth) = analysis
        .price_analysis
        .as_ref()
        .and_then(|p| p.current_deflator_growth)
    {
        insights
            .summary
            .insert("gdp_deflator_growth", format!("{deflator_growth:.2}%"));
        if deflator_growth > HIGH_DEFLATOR_GROWTH {
            insights.observe(format!(
                "High GDP deflator growth ({deflator_growth:.2}%) suggests broad price pressures"
            ));
        }
    }

    insights
}

/// Score growth level, cycle phase and latest quarterly direction
pub fn recession_risk(analysis: &GdpAnalysis) -> RecessionRisk {
    let mut score = 0;

    if let Some(growth) = analysis.current(HEADLINE_GROWTH) {
        score += if growth < 0.0 {
            3
        } else if growth < 1.0 {
            2
        } else if growth < 2.0 {
            1
        } else {
            0
        };
    }

    if analysis
        .business_cycle
        .as_ref()
        .is_some_and(|c| c.current_phase == CyclePhase::Contraction)
    {
        score += 2;
    }

    if analysis.current(REAL_QOQ).is_some_and(|qoq| qoq < 0.0) {
        score += 1;
    }

    RecessionRisk::from_score(score)
}
