//! GDP and economic growth analysis

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::{AgentCore, DomainAnalyzer, SeriesSet, periods_per_year};
use crate::charts::{ChartKind, ChartPanel, ChartSeries, ChartSpec, ReferenceLine};
use crate::insights::{self, InsightBundle};
use crate::metrics::{growth_rate, mean, moving_average, percentile_rank, scaled_growth, std_dev, summary_stats};
use crate::series::{Frequency, TimeSeries};

/// Real GDP year-over-year growth
pub const HEADLINE_GROWTH: &str = "real_gdp_yoy";
pub const REAL_QOQ: &str = "real_gdp_qoq";
pub const PER_CAPITA_YOY: &str = "gdp_per_capita_yoy";
pub const OFFICIAL_GROWTH: &str = "gdp_growth_official";

/// Series reported as levels rather than growth rates
const LEVEL_SERIES: [&str; 3] = ["real_gdp", "nominal_gdp", "gdp_per_capita"];

/// Consecutive negative periods that count as a recession
pub const RECESSION_RUN: usize = 2;

/// Window for the productivity moving average and recent trend
const PRODUCTIVITY_WINDOW: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthHistory {
    pub average_growth: f64,
    pub median_growth: f64,
    pub volatility: Option<f64>,
    pub min_growth: f64,
    pub max_growth: f64,
    pub positive_periods: usize,
    pub negative_periods: usize,
    pub total_periods: usize,
    /// Length of every run of 2+ consecutive negative periods
    pub recession_periods: Vec<usize>,
    pub recession_quarters: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Expansion,
    Contraction,
}

impl CyclePhase {
    fn of(growth: f64) -> Self {
        if growth >= 0.0 { Self::Expansion } else { Self::Contraction }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Expansion => "Expansion",
            Self::Contraction => "Contraction",
        })
    }
}

/// A maximal run of periods in the same phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSpan {
    pub phase: CyclePhase,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration: usize,
    pub is_recession: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessCycle {
    pub current_phase: CyclePhase,
    pub phase_duration: usize,
    pub phases: Vec<PhaseSpan>,
    pub average_expansion_length: Option<f64>,
    pub average_contraction_length: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeflatorAnalysis {
    /// Nominal / real x 100 over their common dates
    pub implied_deflator: TimeSeries,
    pub deflator_growth: TimeSeries,
    pub current_deflator_growth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityAnalysis {
    pub average_productivity_growth: f64,
    pub recent_productivity_trend: f64,
    pub productivity_volatility: Option<f64>,
    pub moving_average: TimeSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthIndicators {
    pub growth_relative_to_average: f64,
    pub growth_percentile: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GdpAnalysis {
    pub growth_rates: BTreeMap<String, TimeSeries>,
    pub current_values: BTreeMap<String, f64>,
    pub historical_analysis: BTreeMap<String, GrowthHistory>,
    pub business_cycle: Option<BusinessCycle>,
    pub price_analysis: Option<DeflatorAnalysis>,
    pub productivity_analysis: Option<ProductivityAnalysis>,
    pub strength_indicators: Option<StrengthIndicators>,
}

impl GdpAnalysis {
    pub fn current(&self, key: &str) -> Option<f64> {
        self.current_values.get(key).copied()
    }
}

/// Agent specialized in GDP and economic growth analysis
pub struct GdpAgent {
    core: AgentCore,
}

impl GdpAgent {
    pub fn new(core: AgentCore) -> Self {
        Self { core }
    }
}

impl DomainAnalyzer for GdpAgent {
    type Analysis = GdpAnalysis;

    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn analyze(&self, data: &SeriesSet) -> GdpAnalysis {
        let mut analysis = GdpAnalysis::default();

        for name in LEVEL_SERIES {
            if let Some(series) = data.get(name) {
                let ppy = periods_per_year(series, Frequency::Quarterly);
                analysis
                    .growth_rates
                    .insert(format!("{name}_qoq"), scaled_growth(series, 1, ppy as f64));
                analysis
                    .growth_rates
                    .insert(format!("{name}_yoy"), growth_rate(series, ppy));
            }
        }

        if let Some(official) = data.get("gdp_growth") {
            analysis
                .growth_rates
                .insert(OFFICIAL_GROWTH.to_string(), official.clone());
        }

        for (name, series) in data.iter().chain(analysis.growth_rates.iter()) {
            if let Some(latest) = series.latest() {
                analysis.current_values.insert(name.clone(), latest);
            }
        }

        for (name, series) in &analysis.growth_rates {
            if let Some(history) = growth_history(series) {
                analysis.historical_analysis.insert(name.clone(), history);
            }
        }

        analysis.business_cycle = analysis
            .growth_rates
            .get(HEADLINE_GROWTH)
            .and_then(business_cycle);

        if let (Some(real), Some(nominal)) = (data.get("real_gdp"), data.get("nominal_gdp")) {
            analysis.price_analysis = deflator_analysis(real, nominal);
        }

        analysis.productivity_analysis = analysis
            .growth_rates
            .get(PER_CAPITA_YOY)
            .and_then(productivity_analysis);

        if let (Some(latest), Some(history), Some(series)) = (
            analysis.current(HEADLINE_GROWTH),
            analysis.historical_analysis.get(HEADLINE_GROWTH),
            analysis.growth_rates.get(HEADLINE_GROWTH),
        ) {
            analysis.strength_indicators = Some(StrengthIndicators {
                growth_relative_to_average: latest - history.average_growth,
                growth_percentile: percentile_rank(series, latest),
            });
        }

        analysis
    }

    fn generate_insights(&self, analysis: &GdpAnalysis) -> InsightBundle {
        insights::gdp::generate(analysis)
    }

    fn visualize(&self, data: &SeriesSet, analysis: &GdpAnalysis) -> Vec<(&'static str, ChartSpec)> {
        let growth = &analysis.growth_rates;
        let series = |key: &str, label: &str| {
            growth
                .get(key)
                .map(|s| ChartSeries::from_series(label, s))
                .unwrap_or_else(|| ChartSeries::from_series(label, &TimeSeries::empty()))
        };
        let level = |key: &str, label: &str| {
            data.get(key)
                .map(|s| ChartSeries::from_series(label, s))
                .unwrap_or_else(|| ChartSeries::from_series(label, &TimeSeries::empty()))
        };
        let zero = || ReferenceLine::new("Zero Growth", 0.0);

        let headline = growth.get(HEADLINE_GROWTH).map(TimeSeries::dropna).unwrap_or_default();
        // Non-finite results become missing, splitting the bars by sign
        let expansion = headline.map(|v| if v >= 0.0 { v } else { f64::NAN });
        let contraction = headline.map(|v| if v < 0.0 { v } else { f64::NAN });

        let mut per_capita = ChartPanel::new("GDP Per Capita Growth (Productivity)", ChartKind::Line)
            .y_label("Growth Rate (%)")
            .series(series(PER_CAPITA_YOY, "Per Capita Growth"))
            .reference(zero());
        if let Some(productivity) = &analysis.productivity_analysis {
            per_capita = per_capita.series(ChartSeries::from_series(
                "8-Quarter Moving Average",
                &productivity.moving_average,
            ));
        }

        let mut charts = vec![(
            "gdp_dashboard",
            ChartSpec::new("GDP Analysis Dashboard")
                .panel(
                    ChartPanel::new("Real GDP Level", ChartKind::Line)
                        .y_label("Billions of Chained 2017 Dollars")
                        .series(level("real_gdp", "Real GDP")),
                )
                .panel(
                    ChartPanel::new("GDP Growth Rates", ChartKind::Line)
                        .y_label("Growth Rate (%)")
                        .series(series(HEADLINE_GROWTH, "Year-over-Year"))
                        .series(series(REAL_QOQ, "Quarter-over-Quarter (Annualized)"))
                        .reference(zero()),
                )
                .panel(
                    ChartPanel::new("Business Cycle (Expansion vs Contraction)", ChartKind::Bar)
                        .y_label("YoY Growth Rate (%)")
                        .series(ChartSeries::from_series("Expansion", &expansion))
                        .series(ChartSeries::from_series("Contraction", &contraction))
                        .reference(ReferenceLine::new("Zero", 0.0)),
                )
                .panel(per_capita),
        )];

        if data.contains_key("real_gdp") && data.contains_key("nominal_gdp") {
            let mut deflator = ChartPanel::new("GDP Deflator Growth", ChartKind::Line)
                .y_label("Growth Rate (%)")
                .reference(ReferenceLine::new("Zero", 0.0));
            if let Some(price) = &analysis.price_analysis {
                deflator = deflator.series(ChartSeries::from_series("Deflator Growth", &price.deflator_growth));
            }
            charts.push((
                "real_vs_nominal_gdp",
                ChartSpec::new("Real vs Nominal GDP")
                    .panel(
                        ChartPanel::new("Real vs Nominal GDP", ChartKind::Line)
                            .y_label("Billions of Dollars")
                            .series(level("real_gdp", "Real GDP"))
                            .series(level("nominal_gdp", "Nominal GDP")),
                    )
                    .panel(deflator),
            ));
        }

        let mut distribution = ChartPanel::new("GDP Growth Rate Distribution", ChartKind::Histogram)
            .x_label("YoY Growth Rate (%)")
            .y_label("Frequency")
            .series(ChartSeries::from_series("Real GDP YoY", &headline))
            .reference(zero());
        if let Some(m) = mean(&headline.present_values()) {
            distribution = distribution.reference(ReferenceLine::new(format!("Mean: {m:.2}%"), m));
        }
        let averages = ChartPanel::new("Average Growth Rates Comparison", ChartKind::Bar)
            .x_label("Measure")
            .y_label("Average Growth Rate (%)")
            .series(ChartSeries::from_categories(
                "Average",
                analysis
                    .historical_analysis
                    .iter()
                    .map(|(k, h)| (insights::readable_key(k), h.average_growth)),
            ));
        charts.push((
            "gdp_distribution_stats",
            ChartSpec::new("GDP Growth Distribution and Statistics")
                .panel(distribution)
                .panel(averages),
        ));

        if let Some(cycle) = &analysis.business_cycle {
            let mut timeline = ChartPanel::new("Business Cycle Timeline", ChartKind::Bar)
                .x_label("Phase Start")
                .y_label("Duration (quarters)");
            for phase in [CyclePhase::Expansion, CyclePhase::Contraction] {
                timeline = timeline.series(ChartSeries::from_categories(
                    phase.to_string(),
                    cycle
                        .phases
                        .iter()
                        .filter(|p| p.phase == phase)
                        .map(|p| (p.start.format("%Y-%m-%d").to_string(), p.duration as f64)),
                ));
            }
            charts.push((
                "business_cycle_timeline",
                ChartSpec::new("Business Cycle Timeline").panel(timeline),
            ));
        }

        charts
    }
}

/// Descriptive statistics plus positive/negative counts and recession runs
pub fn growth_history(series: &TimeSeries) -> Option<GrowthHistory> {
    let stats = summary_stats(series)?;
    let values = series.present_values();

    let mut recession_periods = Vec::new();
    let mut run = 0;
    for v in &values {
        if *v < 0.0 {
            run += 1;
        } else {
            if run >= RECESSION_RUN {
                recession_periods.push(run);
            }
            run = 0;
        }
    }
    if run >= RECESSION_RUN {
        recession_periods.push(run);
    }

    Some(GrowthHistory {
        average_growth: stats.mean,
        median_growth: stats.median,
        volatility: stats.std,
        min_growth: stats.min,
        max_growth: stats.max,
        positive_periods: values.iter().filter(|v| **v > 0.0).count(),
        negative_periods: values.iter().filter(|v| **v < 0.0).count(),
        total_periods: values.len(),
        recession_quarters: recession_periods.iter().sum(),
        recession_periods,
    })
}

/// Split a growth series into expansion (>= 0) and contraction (< 0) phases
///
/// Needs at least two present observations.
pub fn business_cycle(growth: &TimeSeries) -> Option<BusinessCycle> {
    let points: Vec<(NaiveDate, f64)> = growth.present().collect();
    if points.len() < 2 {
        return None;
    }

    let mut phases: Vec<PhaseSpan> = Vec::new();
    for (date, value) in points {
        let phase = CyclePhase::of(value);
        match phases.last_mut() {
            Some(span) if span.phase == phase => {
                span.end = date;
                span.duration += 1;
            }
            _ => phases.push(PhaseSpan {
                phase,
                start: date,
                end: date,
                duration: 1,
                is_recession: false,
            }),
        }
    }
    for span in &mut phases {
        span.is_recession = span.phase == CyclePhase::Contraction && span.duration >= RECESSION_RUN;
    }

    let average_length = |phase: CyclePhase| {
        let lengths: Vec<f64> = phases
            .iter()
            .filter(|p| p.phase == phase)
            .map(|p| p.duration as f64)
            .collect();
        mean(&lengths)
    };
    let average_expansion_length = average_length(CyclePhase::Expansion);
    let average_contraction_length = average_length(CyclePhase::Contraction);

    let current = phases.last()?;
    Some(BusinessCycle {
        current_phase: current.phase,
        phase_duration: current.duration,
        average_expansion_length,
        average_contraction_length,
        phases,
    })
}

fn deflator_analysis(real: &TimeSeries, nominal: &TimeSeries) -> Option<DeflatorAnalysis> {
    let implied_deflator = nominal.zip_with(real, |n, r| n / r * 100.0);
    if implied_deflator.is_empty() {
        return None;
    }
    let ppy = periods_per_year(&implied_deflator, Frequency::Quarterly);
    let deflator_growth = growth_rate(&implied_deflator, ppy);
    Some(DeflatorAnalysis {
        current_deflator_growth: deflator_growth.latest(),
        implied_deflator,
        deflator_growth,
    })
}

fn productivity_analysis(per_capita_growth: &TimeSeries) -> Option<ProductivityAnalysis> {
    let clean = per_capita_growth.dropna();
    let values = clean.present_values();
    Some(ProductivityAnalysis {
        average_productivity_growth: mean(&values)?,
        recent_productivity_trend: mean(&clean.tail(PRODUCTIVITY_WINDOW).present_values())?,
        productivity_volatility: std_dev(&values),
        moving_average: moving_average(&clean, PRODUCTIVITY_WINDOW),
    })
}
