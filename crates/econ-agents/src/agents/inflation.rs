//! Inflation analysis: price index rates, averages, volatility and trends

use std::collections::BTreeMap;

use serde::Serialize;

use super::{AgentCore, DomainAnalyzer, SeriesSet, periods_per_year};
use crate::charts::{ChartKind, ChartPanel, ChartSeries, ChartSpec, ReferenceLine};
use crate::insights::{self, InsightBundle};
use crate::metrics::{coefficient_of_variation, correlation, growth_rate, mean, moving_average, std_dev, volatility};
use crate::series::{Frequency, TimeSeries};

/// Headline CPI year-over-year rate
pub const HEADLINE_RATE: &str = "cpi_all_rate";
pub const CORE_RATE: &str = "core_cpi_rate";
pub const PCE_RATE: &str = "pce_rate";
pub const CORE_PCE_RATE: &str = "core_pce_rate";

/// The Federal Reserve's inflation target, in percent
pub const FED_TARGET: f64 = 2.0;

/// Moving-average window and half-window used for trend detection
const TREND_WINDOW: usize = 12;
const TREND_HALF: usize = 6;

const MAIN_MEASURES: [&str; 4] = [HEADLINE_RATE, CORE_RATE, PCE_RATE, CORE_PCE_RATE];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalAverages {
    pub all_time: f64,
    /// Mean over each trailing window, keyed by label (`1Y`, `5Y`, ...)
    pub windows: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityStats {
    pub standard_deviation: Option<f64>,
    pub coefficient_variation: Option<f64>,
    pub rolling_volatility: TimeSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub moving_average: TimeSeries,
    pub recent_average: f64,
    pub previous_average: f64,
    pub direction: TrendDirection,
    pub magnitude: f64,
}

/// Headline against core CPI over their common dates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreHeadlineComparison {
    pub correlation: Option<f64>,
    pub average_difference: f64,
    pub current_difference: f64,
    pub difference: TimeSeries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InflationAnalysis {
    /// Year-over-year rate per price index, keyed `<name>_rate`
    pub inflation_rates: BTreeMap<String, TimeSeries>,
    pub current_levels: BTreeMap<String, f64>,
    pub historical_averages: BTreeMap<String, HistoricalAverages>,
    pub volatility: BTreeMap<String, VolatilityStats>,
    pub trends: BTreeMap<String, TrendAnalysis>,
    pub core_vs_headline: Option<CoreHeadlineComparison>,
}

impl InflationAnalysis {
    pub fn current(&self, key: &str) -> Option<f64> {
        self.current_levels.get(key).copied()
    }
}

/// Agent specialized in inflation analysis
pub struct InflationAgent {
    core: AgentCore,
}

impl InflationAgent {
    pub fn new(core: AgentCore) -> Self {
        Self { core }
    }
}

impl DomainAnalyzer for InflationAgent {
    type Analysis = InflationAnalysis;

    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn analyze(&self, data: &SeriesSet) -> InflationAnalysis {
        let settings = self.core.settings();
        let mut analysis = InflationAnalysis::default();

        for (name, series) in data {
            let ppy = periods_per_year(series, Frequency::Monthly);
            analysis
                .inflation_rates
                .insert(format!("{name}_rate"), growth_rate(series, ppy));
        }

        for (name, rates) in &analysis.inflation_rates {
            if let Some(latest) = rates.latest() {
                analysis.current_levels.insert(name.clone(), latest);
            }

            let clean = rates.dropna();
            let values = clean.present_values();
            let ppy = periods_per_year(rates, Frequency::Monthly);

            if let Some(all_time) = mean(&values) {
                let windows = settings
                    .analysis_windows
                    .iter()
                    .filter_map(|w| {
                        let periods = w.years as usize * ppy;
                        mean(&clean.tail(periods).present_values()).map(|m| (w.label(), m))
                    })
                    .collect();
                analysis
                    .historical_averages
                    .insert(name.clone(), HistoricalAverages { all_time, windows });
            }

            if values.len() > 12 {
                let frequency = clean.frequency().unwrap_or(Frequency::Monthly);
                analysis.volatility.insert(
                    name.clone(),
                    VolatilityStats {
                        standard_deviation: std_dev(&values),
                        coefficient_variation: coefficient_of_variation(&values),
                        rolling_volatility: volatility(&clean, settings.volatility_window, frequency),
                    },
                );
            }

            if values.len() > 24 {
                if let Some(trend) = trend_analysis(&clean) {
                    analysis.trends.insert(name.clone(), trend);
                }
            }
        }

        if let (Some(headline), Some(core)) = (
            analysis.inflation_rates.get(HEADLINE_RATE),
            analysis.inflation_rates.get(CORE_RATE),
        ) {
            analysis.core_vs_headline = compare_core_headline(headline, core);
        }

        analysis
    }

    fn generate_insights(&self, analysis: &InflationAnalysis) -> InsightBundle {
        insights::inflation::generate(analysis)
    }

    fn visualize(&self, _data: &SeriesSet, analysis: &InflationAnalysis) -> Vec<(&'static str, ChartSpec)> {
        let rates = &analysis.inflation_rates;
        let target = || ReferenceLine::new("Fed Target (2%)", FED_TARGET);

        let mut measures = ChartPanel::new("Key Inflation Measures", ChartKind::Line)
            .y_label("Inflation Rate (%)")
            .reference(target());
        for key in MAIN_MEASURES {
            if let Some(series) = rates.get(key) {
                measures = measures.series(ChartSeries::from_series(insights::readable_key(key), series));
            }
        }

        let headline = rates.get(HEADLINE_RATE).map(TimeSeries::dropna).unwrap_or_default();
        let recent = ChartPanel::new("CPI Inflation - Last 5 Years", ChartKind::Area)
            .y_label("Inflation Rate (%)")
            .series(ChartSeries::from_series("CPI", &headline.tail(60)))
            .reference(target());

        let mut vol_panel = ChartPanel::new("CPI Inflation Volatility (12M Rolling)", ChartKind::Area).y_label("Volatility");
        if let Some(vol) = analysis.volatility.get(HEADLINE_RATE) {
            vol_panel = vol_panel.series(ChartSeries::from_series("Volatility", &vol.rolling_volatility));
        }

        let levels = ChartPanel::new("Current Inflation Levels", ChartKind::Bar)
            .x_label("Measure")
            .y_label("Inflation Rate (%)")
            .series(ChartSeries::from_categories(
                "Current",
                MAIN_MEASURES
                    .iter()
                    .filter_map(|k| analysis.current(k).map(|v| (readable_name_upper(k), v))),
            ))
            .reference(target());

        let mut charts = vec![(
            "inflation_dashboard",
            ChartSpec::new("Inflation Analysis Dashboard")
                .panel(measures)
                .panel(recent)
                .panel(vol_panel)
                .panel(levels),
        )];

        if let (Some(cmp), Some(core)) = (&analysis.core_vs_headline, rates.get(CORE_RATE)) {
            let aligned_headline = headline.zip_with(core, |h, _| h);
            let aligned_core = core.zip_with(&headline, |c, _| c);
            charts.push((
                "core_vs_headline_comparison",
                ChartSpec::new("Headline vs Core CPI Inflation")
                    .panel(
                        ChartPanel::new("Headline vs Core CPI Inflation", ChartKind::Line)
                            .y_label("Inflation Rate (%)")
                            .series(ChartSeries::from_series("Headline CPI", &aligned_headline))
                            .series(ChartSeries::from_series("Core CPI", &aligned_core))
                            .reference(target()),
                    )
                    .panel(
                        ChartPanel::new("Headline vs Core CPI Difference", ChartKind::Area)
                            .y_label("Difference (Headline - Core) %")
                            .series(ChartSeries::from_series("Difference", &cmp.difference))
                            .reference(ReferenceLine::new("Zero", 0.0)),
                    ),
            ));
        }

        let mut distribution = ChartPanel::new("CPI Inflation Distribution", ChartKind::Histogram)
            .x_label("Inflation Rate (%)")
            .y_label("Frequency")
            .series(ChartSeries::from_series("CPI", &headline))
            .reference(ReferenceLine::new("Fed Target: 2.0%", FED_TARGET));
        if let Some(m) = mean(&headline.present_values()) {
            distribution = distribution.reference(ReferenceLine::new(format!("Mean: {m:.2}%"), m));
        }

        let mut comparison = ChartPanel::new("Inflation Measures Comparison", ChartKind::BoxPlot)
            .x_label("Measure")
            .y_label("Inflation Rate (%)")
            .reference(target());
        for key in MAIN_MEASURES {
            if let Some(series) = rates.get(key) {
                comparison = comparison.series(ChartSeries::from_series(readable_name_upper(key), series));
            }
        }

        charts.push((
            "inflation_distribution",
            ChartSpec::new("Inflation Distribution Analysis")
                .panel(distribution)
                .panel(comparison),
        ));

        charts
    }
}

/// 12-period moving average, comparing its last 6 values with the 6 before
pub fn trend_analysis(series: &TimeSeries) -> Option<TrendAnalysis> {
    let ma = moving_average(series, TREND_WINDOW);
    let last_year = ma.tail(TREND_WINDOW);
    let recent_average = mean(&last_year.tail(TREND_HALF).present_values())?;
    let previous_average = mean(&last_year.head(TREND_HALF).present_values())?;

    let direction = if recent_average > previous_average {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    Some(TrendAnalysis {
        moving_average: ma,
        recent_average,
        previous_average,
        direction,
        magnitude: (recent_average - previous_average).abs(),
    })
}

fn compare_core_headline(headline: &TimeSeries, core: &TimeSeries) -> Option<CoreHeadlineComparison> {
    let pairs = headline.aligned_pairs(core);
    let (_, last_h, last_c) = *pairs.last()?;
    let diffs: Vec<f64> = pairs.iter().map(|(_, h, c)| h - c).collect();

    Some(CoreHeadlineComparison {
        correlation: correlation(headline, core).map(|(r, _)| r),
        average_difference: mean(&diffs)?,
        current_difference: last_h - last_c,
        difference: headline.dropna().zip_with(&core.dropna(), |h, c| h - c),
    })
}

fn readable_name_upper(key: &str) -> String {
    insights::readable_name(key).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AnalysisSettings;
    use crate::api::MockDataSource;
    use crate::domain::Domain;
    use crate::series::test_support::*;
    use std::sync::Arc;

    fn agent() -> InflationAgent {
        InflationAgent::new(AgentCore::new(
            Domain::Inflation,
            Vec::new(),
            Arc::new(MockDataSource::new()),
            AnalysisSettings::default(),
        ))
    }

    /// Index rising by `monthly_pct` percent each month
    fn index(months: usize, monthly_pct: f64) -> TimeSeries {
        let values: Vec<f64> = (0..months)
            .map(|i| 100.0 * (1.0 + monthly_pct / 100.0).powi(i as i32))
            .collect();
        monthly(2015, &values)
    }

    #[test]
    fn test_every_index_gets_a_rate() {
        let data = SeriesSet::from([
            ("cpi_all".to_string(), index(36, 0.25)),
            ("producer_price".to_string(), index(36, 0.1)),
        ]);
        let analysis = agent().analyze(&data);

        assert!(analysis.inflation_rates.contains_key("cpi_all_rate"));
        assert!(analysis.inflation_rates.contains_key("producer_price_rate"));

        let headline = analysis.current(HEADLINE_RATE).unwrap();
        let expected = (1.0025_f64.powi(12) - 1.0) * 100.0;
        assert!((headline - expected).abs() < 1e-9);
    }

    #[test]
    fn test_falling_prices_have_negative_variation() {
        let values: Vec<f64> = (0..36)
            .map(|i| 100.0 * 0.995_f64.powi(i) * (1.0 + f64::from(i % 5) * 0.03))
            .collect();
        let data = SeriesSet::from([("cpi_all".to_string(), monthly(2015, &values))]);
        let agent = agent();
        let analysis = agent.analyze(&data);

        let cv = analysis.volatility[HEADLINE_RATE].coefficient_variation.unwrap();
        assert!(cv < 0.0);

        let insights = agent.generate_insights(&analysis);
        assert!(!insights.observations.iter().any(|o| o.contains("high volatility")));
    }

    #[test]
    fn test_short_series_has_no_rate_values() {
        let data = SeriesSet::from([("cpi_all".to_string(), index(6, 0.25))]);
        let analysis = agent().analyze(&data);

        assert!(analysis.current_levels.is_empty());
        assert!(analysis.historical_averages.is_empty());
        assert!(analysis.volatility.is_empty());
        assert!(analysis.trends.is_empty());
    }

    #[test]
    fn test_historical_windows() {
        let data = SeriesSet::from([("cpi_all".to_string(), index(48, 0.2))]);
        let analysis = agent().analyze(&data);
        let averages = &analysis.historical_averages[HEADLINE_RATE];

        assert!(averages.windows.contains_key("1Y"));
        assert!(averages.windows.contains_key("5Y"));
        assert_eq!(averages.windows.len(), 4);
        // Constant growth: every window has the same mean
        assert!((averages.windows["1Y"] - averages.all_time).abs() < 1e-9);
    }

    #[test]
    fn test_trend_detection() {
        // Accelerating prices
        let values: Vec<f64> = (0..48).map(|i| 100.0 + 0.01 * f64::from(i * i)).collect();
        let trend = trend_analysis(&growth_rate(&monthly(2015, &values), 12).dropna()).unwrap();
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert!(trend.magnitude > 0.0);

        let flat_rates = monthly(2015, &[3.0; 30]);
        let flat = trend_analysis(&flat_rates).unwrap();
        assert_eq!(flat.direction, TrendDirection::Decreasing);
        assert_eq!(flat.magnitude, 0.0);
    }

    #[test]
    fn test_core_vs_headline() {
        let headline = monthly(2020, &[3.0, 4.0, 5.0]);
        let core = monthly(2020, &[2.0, 2.5, 3.0]);
        let cmp = compare_core_headline(&headline, &core).unwrap();

        assert!((cmp.average_difference - 1.5).abs() < 1e-9);
        assert!((cmp.current_difference - 2.0).abs() < 1e-9);
        assert!((cmp.correlation.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_visualize_names() {
        let data = SeriesSet::from([
            ("cpi_all".to_string(), index(36, 0.25)),
            ("core_cpi".to_string(), index(36, 0.2)),
        ]);
        let agent = agent();
        let analysis = agent.analyze(&data);
        let names: Vec<_> = agent.visualize(&data, &analysis).into_iter().map(|(n, _)| n).collect();

        assert_eq!(
            names,
            vec!["inflation_dashboard", "core_vs_headline_comparison", "inflation_distribution"]
        );
    }
}
