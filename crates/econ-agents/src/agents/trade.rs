//! International trade analysis: balance, competitiveness, prices and seasonality

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use super::{AgentCore, DomainAnalyzer, SeriesSet, periods_per_year};
use crate::charts::{ChartKind, ChartPanel, ChartSeries, ChartSpec, ReferenceLine};
use crate::insights::{self, InsightBundle};
use crate::metrics::{
    SummaryStats, coefficient_of_variation, correlation, growth_rate, mean, moving_average, scaled_growth,
    std_dev, summary_stats, volatility,
};
use crate::series::{Frequency, TimeSeries};

/// Exports year-over-year growth
pub const HEADLINE_GROWTH: &str = "exports_yoy";
pub const IMPORTS_GROWTH: &str = "imports_yoy";
pub const IMPORT_PRICE_GROWTH: &str = "import_price_index_yoy";
pub const EXPORT_PRICE_GROWTH: &str = "export_price_index_yoy";

const VOLUME_SERIES: [&str; 2] = ["exports", "imports"];
const PRICE_SERIES: [&str; 2] = ["export_price_index", "import_price_index"];

/// Window for balance and competitiveness trends
const TREND_WINDOW: usize = 12;
/// Seasonality needs more than two years of observations
const MIN_SEASONAL_POINTS: usize = 24;

/// Exports minus imports over their common dates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceAnalysis {
    pub calculated_balance: TimeSeries,
    pub current_balance: Option<f64>,
    pub average_balance: Option<f64>,
    pub balance_trend: TimeSeries,
    pub export_import_ratio: TimeSeries,
    /// Exports as a percentage of imports
    pub coverage_ratio: TimeSeries,
    pub balance_volatility: TimeSeries,
}

/// The published balance of goods and services
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficialBalance {
    pub series: TimeSeries,
    pub current_balance: Option<f64>,
    pub average_balance: Option<f64>,
    pub balance_growth: TimeSeries,
    pub trend: TimeSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportImportAnalysis {
    pub exports_summary: SummaryStats,
    pub imports_summary: SummaryStats,
    pub exports_growth_summary: Option<SummaryStats>,
    pub imports_growth_summary: Option<SummaryStats>,
    pub correlation: Option<f64>,
    pub exports_volatility: Option<f64>,
    pub imports_volatility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAnalysis {
    /// Export price index over import price index
    pub terms_of_trade: TimeSeries,
    pub terms_of_trade_growth: TimeSeries,
    pub current_terms_of_trade: Option<f64>,
    pub current_terms_growth: Option<f64>,
    pub price_correlation: Option<f64>,
}

/// Export growth minus import growth
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Competitiveness {
    pub growth_differential: TimeSeries,
    pub current_growth_diff: Option<f64>,
    pub average_growth_diff: Option<f64>,
    pub competitiveness_trend: TimeSeries,
    pub export_advantage_periods: usize,
    pub import_advantage_periods: usize,
}

/// Calendar-month profile of a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Seasonality {
    pub monthly_averages: BTreeMap<u32, f64>,
    pub monthly_std: BTreeMap<u32, Option<f64>>,
    pub peak_month: u32,
    pub trough_month: u32,
    pub seasonal_range: f64,
    /// Dispersion of the monthly means, in percent of their mean
    pub coefficient_variation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeIntensity {
    pub total_trade_volume: TimeSeries,
    pub total_trade_growth: TimeSeries,
    pub exports_share_of_trade: TimeSeries,
    pub imports_share_of_trade: TimeSeries,
    pub trade_growth_volatility: TimeSeries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeAnalysis {
    pub growth_rates: BTreeMap<String, TimeSeries>,
    pub current_values: BTreeMap<String, f64>,
    pub balance: Option<BalanceAnalysis>,
    pub official_balance: Option<OfficialBalance>,
    pub export_import: Option<ExportImportAnalysis>,
    pub price: Option<PriceAnalysis>,
    pub competitiveness: Option<Competitiveness>,
    pub seasonality: BTreeMap<String, Seasonality>,
    pub intensity: Option<TradeIntensity>,
}

impl TradeAnalysis {
    pub fn current(&self, key: &str) -> Option<f64> {
        self.current_values.get(key).copied()
    }

    /// Latest official balance, else the calculated one
    pub fn current_balance(&self) -> Option<f64> {
        self.official_balance
            .as_ref()
            .and_then(|b| b.current_balance)
            .or_else(|| self.balance.as_ref().and_then(|b| b.current_balance))
    }

    /// Latest export coverage of imports, in percent
    pub fn current_coverage(&self) -> Option<f64> {
        self.balance.as_ref().and_then(|b| b.coverage_ratio.latest())
    }
}

/// Agent specialized in international trade analysis
pub struct TradeAgent {
    core: AgentCore,
}

impl TradeAgent {
    pub fn new(core: AgentCore) -> Self {
        Self { core }
    }
}

impl DomainAnalyzer for TradeAgent {
    type Analysis = TradeAnalysis;

    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn analyze(&self, data: &SeriesSet) -> TradeAnalysis {
        let window = self.core.settings().volatility_window;
        let mut analysis = TradeAnalysis::default();

        for name in VOLUME_SERIES {
            if let Some(series) = data.get(name) {
                let ppy = periods_per_year(series, Frequency::Monthly);
                analysis
                    .growth_rates
                    .insert(format!("{name}_mom"), scaled_growth(series, 1, ppy as f64));
                analysis
                    .growth_rates
                    .insert(format!("{name}_yoy"), growth_rate(series, ppy));
            }
        }
        for name in PRICE_SERIES {
            if let Some(series) = data.get(name) {
                let ppy = periods_per_year(series, Frequency::Monthly);
                analysis
                    .growth_rates
                    .insert(format!("{name}_yoy"), growth_rate(series, ppy));
            }
        }

        for (name, series) in data.iter().chain(analysis.growth_rates.iter()) {
            if let Some(latest) = series.latest() {
                analysis.current_values.insert(name.clone(), latest);
            }
        }

        if let (Some(exports), Some(imports)) = (data.get("exports"), data.get("imports")) {
            analysis.balance = balance_analysis(exports, imports, window);
            analysis.export_import = export_import_analysis(exports, imports, &analysis.growth_rates);
            analysis.intensity = trade_intensity(exports, imports, window);
        }

        if let Some(official) = data.get("trade_balance") {
            let ppy = periods_per_year(official, Frequency::Monthly);
            analysis.official_balance = Some(OfficialBalance {
                current_balance: official.latest(),
                average_balance: mean(&official.present_values()),
                balance_growth: growth_rate(official, ppy),
                trend: moving_average(official, TREND_WINDOW),
                series: official.clone(),
            });
        }

        if let (Some(export_prices), Some(import_prices)) =
            (data.get("export_price_index"), data.get("import_price_index"))
        {
            analysis.price = price_analysis(export_prices, import_prices);
        }

        if let (Some(export_growth), Some(import_growth)) = (
            analysis.growth_rates.get(HEADLINE_GROWTH),
            analysis.growth_rates.get(IMPORTS_GROWTH),
        ) {
            analysis.competitiveness = competitiveness(export_growth, import_growth);
        }

        for (name, series) in data {
            if series.len() > MIN_SEASONAL_POINTS {
                match seasonality(series) {
                    Some(profile) => {
                        analysis.seasonality.insert(name.clone(), profile);
                    }
                    None => tracing::warn!("Could not analyze seasonality of {name}"),
                }
            }
        }

        analysis
    }

    fn generate_insights(&self, analysis: &TradeAnalysis) -> InsightBundle {
        insights::trade::generate(analysis)
    }

    fn visualize(&self, data: &SeriesSet, analysis: &TradeAnalysis) -> Vec<(&'static str, ChartSpec)> {
        let growth = &analysis.growth_rates;
        let growth_series = |key: &str, label: &str| {
            ChartSeries::from_series(label, growth.get(key).unwrap_or(&TimeSeries::empty()))
        };
        let level = |key: &str, label: &str| ChartSeries::from_series(label, data.get(key).unwrap_or(&TimeSeries::empty()));
        let zero = || ReferenceLine::new("Zero", 0.0);

        let balance = data
            .get("trade_balance")
            .map(TimeSeries::dropna)
            .or_else(|| analysis.balance.as_ref().map(|b| b.calculated_balance.dropna()))
            .unwrap_or_default();

        let mut terms = ChartPanel::new("Terms of Trade (Export/Import Prices)", ChartKind::Line).y_label("Index Ratio");
        if let Some(price) = &analysis.price {
            terms = terms
                .series(ChartSeries::from_series("Terms of Trade", &price.terms_of_trade))
                .series(ChartSeries::from_series(
                    "12M Moving Average",
                    &moving_average(&price.terms_of_trade.dropna(), TREND_WINDOW),
                ));
        }

        let mut charts = vec![(
            "trade_dashboard",
            ChartSpec::new("Trade Analysis Dashboard")
                .panel(
                    ChartPanel::new("Exports and Imports Levels", ChartKind::Line)
                        .y_label("Billions of Dollars")
                        .series(level("exports", "Exports"))
                        .series(level("imports", "Imports")),
                )
                .panel(
                    ChartPanel::new("Trade Balance", ChartKind::Bar)
                        .y_label("Billions of Dollars")
                        .series(ChartSeries::from_series("Surplus", &split_sign(&balance, true)))
                        .series(ChartSeries::from_series("Deficit", &split_sign(&balance, false)))
                        .reference(zero()),
                )
                .panel(
                    ChartPanel::new("Trade Growth Rates", ChartKind::Line)
                        .y_label("Growth Rate (%)")
                        .series(growth_series(HEADLINE_GROWTH, "Exports YoY"))
                        .series(growth_series(IMPORTS_GROWTH, "Imports YoY"))
                        .reference(zero()),
                )
                .panel(terms),
        )];

        if let Some(comp) = &analysis.competitiveness {
            charts.push((
                "trade_competitiveness",
                ChartSpec::new("Trade Competitiveness")
                    .panel(
                        ChartPanel::new("Export vs Import Growth Comparison", ChartKind::Line)
                            .y_label("Growth Rate (%)")
                            .series(growth_series(HEADLINE_GROWTH, "Export Growth"))
                            .series(growth_series(IMPORTS_GROWTH, "Import Growth"))
                            .reference(zero()),
                    )
                    .panel(
                        ChartPanel::new("Trade Competitiveness (Export Growth - Import Growth)", ChartKind::Bar)
                            .y_label("Growth Rate Difference (pp)")
                            .series(ChartSeries::from_series(
                                "Export Advantage",
                                &split_sign(&comp.growth_differential, true),
                            ))
                            .series(ChartSeries::from_series(
                                "Import Advantage",
                                &split_sign(&comp.growth_differential, false),
                            ))
                            .series(ChartSeries::from_series("Trend", &comp.competitiveness_trend))
                            .reference(zero()),
                    ),
            ));
        }

        if let Some(price) = &analysis.price {
            if growth.contains_key(EXPORT_PRICE_GROWTH) && growth.contains_key(IMPORT_PRICE_GROWTH) {
                charts.push((
                    "trade_price_analysis",
                    ChartSpec::new("Trade Price Analysis")
                        .panel(
                            ChartPanel::new("Export and Import Price Growth", ChartKind::Line)
                                .y_label("Price Growth (%)")
                                .series(growth_series(EXPORT_PRICE_GROWTH, "Export Price Growth"))
                                .series(growth_series(IMPORT_PRICE_GROWTH, "Import Price Growth"))
                                .reference(zero()),
                        )
                        .panel(
                            ChartPanel::new("Terms of Trade Growth", ChartKind::Bar)
                                .y_label("Growth Rate (%)")
                                .series(ChartSeries::from_series(
                                    "Improving",
                                    &split_sign(&price.terms_of_trade_growth, true),
                                ))
                                .series(ChartSeries::from_series(
                                    "Deteriorating",
                                    &split_sign(&price.terms_of_trade_growth, false),
                                ))
                                .reference(zero()),
                        ),
                ));
            }
        }

        if !analysis.seasonality.is_empty() {
            let mut seasonal = ChartPanel::new("Average Level by Calendar Month", ChartKind::Line)
                .x_label("Month")
                .y_label("Average Level");
            for (name, profile) in &analysis.seasonality {
                seasonal = seasonal.series(ChartSeries::from_categories(
                    insights::readable_key(name),
                    profile.monthly_averages.iter().map(|(m, v)| (m.to_string(), *v)),
                ));
            }
            charts.push((
                "trade_volume_seasonal",
                ChartSpec::new("Trade Seasonal Patterns").panel(seasonal),
            ));
        }

        let mut stats = ChartSpec::new("Trade Statistics");
        if let Some(intensity) = &analysis.intensity {
            stats = stats
                .panel(
                    ChartPanel::new("Total Trade Volume", ChartKind::Area)
                        .y_label("Billions of Dollars")
                        .series(ChartSeries::from_series("Exports + Imports", &intensity.total_trade_volume)),
                )
                .panel(
                    ChartPanel::new("Share of Total Trade", ChartKind::Line)
                        .y_label("Share (%)")
                        .series(ChartSeries::from_series("Exports", &intensity.exports_share_of_trade))
                        .series(ChartSeries::from_series("Imports", &intensity.imports_share_of_trade))
                        .reference(ReferenceLine::new("Parity", 50.0)),
                );
        }
        if let Some(balance) = &analysis.balance {
            stats = stats.panel(
                ChartPanel::new("Export Coverage of Imports", ChartKind::Line)
                    .y_label("Coverage (%)")
                    .series(ChartSeries::from_series("Coverage", &balance.coverage_ratio))
                    .reference(ReferenceLine::new("Balanced Trade", 100.0)),
            );
        }
        charts.push(("trade_statistics", stats));

        charts
    }
}

/// Keep values on one side of zero; the other side becomes missing
fn split_sign(series: &TimeSeries, non_negative: bool) -> TimeSeries {
    series.map(|v| if (v >= 0.0) == non_negative { v } else { f64::NAN })
}

pub fn balance_analysis(exports: &TimeSeries, imports: &TimeSeries, window: usize) -> Option<BalanceAnalysis> {
    let calculated_balance = exports.zip_with(imports, |e, i| e - i);
    if calculated_balance.is_empty() {
        return None;
    }
    let frequency = calculated_balance.frequency().unwrap_or(Frequency::Monthly);
    let export_import_ratio = exports.zip_with(imports, |e, i| e / i);

    Some(BalanceAnalysis {
        current_balance: calculated_balance.latest(),
        average_balance: mean(&calculated_balance.present_values()),
        balance_trend: moving_average(&calculated_balance, TREND_WINDOW),
        coverage_ratio: export_import_ratio.map(|r| r * 100.0),
        export_import_ratio,
        balance_volatility: volatility(&calculated_balance, window, frequency),
        calculated_balance,
    })
}

fn export_import_analysis(
    exports: &TimeSeries,
    imports: &TimeSeries,
    growth: &BTreeMap<String, TimeSeries>,
) -> Option<ExportImportAnalysis> {
    let pairs = exports.aligned_pairs(imports);
    if pairs.is_empty() {
        return None;
    }
    let dates: Vec<_> = pairs.iter().map(|(d, _, _)| *d).collect();
    let aligned_exports = TimeSeries::from_parts(&dates, pairs.iter().map(|(_, e, _)| Some(*e)).collect());
    let aligned_imports = TimeSeries::from_parts(&dates, pairs.iter().map(|(_, _, i)| Some(*i)).collect());

    Some(ExportImportAnalysis {
        exports_summary: summary_stats(&aligned_exports)?,
        imports_summary: summary_stats(&aligned_imports)?,
        exports_growth_summary: growth.get(HEADLINE_GROWTH).and_then(summary_stats),
        imports_growth_summary: growth.get(IMPORTS_GROWTH).and_then(summary_stats),
        correlation: correlation(&aligned_exports, &aligned_imports).map(|(r, _)| r),
        exports_volatility: std_dev(&aligned_exports.present_values()),
        imports_volatility: std_dev(&aligned_imports.present_values()),
    })
}

pub fn price_analysis(export_prices: &TimeSeries, import_prices: &TimeSeries) -> Option<PriceAnalysis> {
    let terms_of_trade = export_prices.zip_with(import_prices, |e, i| e / i).dropna();
    if terms_of_trade.is_empty() {
        return None;
    }
    let ppy = periods_per_year(&terms_of_trade, Frequency::Monthly);
    let terms_of_trade_growth = growth_rate(&terms_of_trade, ppy);

    Some(PriceAnalysis {
        current_terms_of_trade: terms_of_trade.latest(),
        current_terms_growth: terms_of_trade_growth.latest(),
        price_correlation: correlation(export_prices, import_prices).map(|(r, _)| r),
        terms_of_trade,
        terms_of_trade_growth,
    })
}

pub fn competitiveness(export_growth: &TimeSeries, import_growth: &TimeSeries) -> Option<Competitiveness> {
    let growth_differential = export_growth.zip_with(import_growth, |e, i| e - i).dropna();
    if growth_differential.is_empty() {
        return None;
    }
    let values = growth_differential.present_values();

    Some(Competitiveness {
        current_growth_diff: growth_differential.latest(),
        average_growth_diff: mean(&values),
        competitiveness_trend: moving_average(&growth_differential, TREND_WINDOW),
        export_advantage_periods: values.iter().filter(|v| **v > 0.0).count(),
        import_advantage_periods: values.iter().filter(|v| **v < 0.0).count(),
        growth_differential,
    })
}

/// Group present values by calendar month
pub fn seasonality(series: &TimeSeries) -> Option<Seasonality> {
    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for (date, value) in series.present() {
        by_month.entry(date.month()).or_default().push(value);
    }

    let monthly_averages: BTreeMap<u32, f64> = by_month
        .iter()
        .filter_map(|(m, values)| mean(values).map(|avg| (*m, avg)))
        .collect();
    let monthly_std = by_month.iter().map(|(m, values)| (*m, std_dev(values))).collect();

    let (peak_month, peak) = monthly_averages
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(m, v)| (*m, *v))?;
    let (trough_month, trough) = monthly_averages
        .iter()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(m, v)| (*m, *v))?;

    let means: Vec<f64> = monthly_averages.values().copied().collect();
    Some(Seasonality {
        coefficient_variation: coefficient_of_variation(&means).map(|cv| cv * 100.0),
        monthly_averages,
        monthly_std,
        peak_month,
        trough_month,
        seasonal_range: peak - trough,
    })
}

fn trade_intensity(exports: &TimeSeries, imports: &TimeSeries, window: usize) -> Option<TradeIntensity> {
    let total_trade_volume = exports.zip_with(imports, |e, i| e + i).dropna();
    if total_trade_volume.is_empty() {
        return None;
    }
    let frequency = total_trade_volume.frequency().unwrap_or(Frequency::Monthly);
    let total_trade_growth = growth_rate(&total_trade_volume, frequency.periods_per_year());

    Some(TradeIntensity {
        exports_share_of_trade: exports.zip_with(&total_trade_volume, |e, t| e / t * 100.0),
        imports_share_of_trade: imports.zip_with(&total_trade_volume, |i, t| i / t * 100.0),
        trade_growth_volatility: volatility(&total_trade_growth, window, frequency),
        total_trade_volume,
        total_trade_growth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AnalysisSettings;
    use crate::api::MockDataSource;
    use crate::domain::Domain;
    use crate::series::test_support::*;
    use std::sync::Arc;

    fn agent() -> TradeAgent {
        TradeAgent::new(AgentCore::new(
            Domain::Trade,
            Vec::new(),
            Arc::new(MockDataSource::new()),
            AnalysisSettings::default(),
        ))
    }

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_balance_and_coverage() {
        let exports = monthly(2024, &[100.0, 110.0]);
        let imports = monthly(2024, &[90.0, 95.0]);
        let balance = balance_analysis(&exports, &imports, 12).unwrap();

        assert_eq!(balance.calculated_balance.present_values(), vec![10.0, 15.0]);
        assert_eq!(balance.current_balance, Some(15.0));
        assert_eq!(balance.average_balance, Some(12.5));

        let coverage = balance.coverage_ratio.present_values();
        assert!(approx(coverage[0], 111.1, 0.05));
        assert!(approx(coverage[1], 115.8, 0.05));
    }

    #[test]
    fn test_balance_uses_common_dates_only() {
        let exports = monthly(2024, &[100.0, 110.0, 120.0]);
        let imports = monthly_opt(2024, &[None, Some(95.0)]);
        let balance = balance_analysis(&exports, &imports, 12).unwrap();

        assert_eq!(balance.calculated_balance.len(), 2);
        assert_eq!(balance.calculated_balance.values(), vec![None, Some(15.0)]);
    }

    #[test]
    fn test_competitiveness_counts() {
        let exports = monthly(2024, &[5.0, 1.0, 3.0, 2.0]);
        let imports = monthly(2024, &[2.0, 4.0, 3.0, 1.0]);
        let comp = competitiveness(&exports, &imports).unwrap();

        assert_eq!(comp.growth_differential.present_values(), vec![3.0, -3.0, 0.0, 1.0]);
        assert_eq!(comp.export_advantage_periods, 2);
        assert_eq!(comp.import_advantage_periods, 1);
        assert_eq!(comp.current_growth_diff, Some(1.0));
        assert_eq!(comp.average_growth_diff, Some(0.25));
    }

    #[test]
    fn test_seasonality_peak_and_trough() {
        let values: Vec<f64> = (0..36).map(|i| if i % 12 == 6 { 200.0 } else if i % 12 == 1 { 50.0 } else { 100.0 }).collect();
        let profile = seasonality(&monthly(2020, &values)).unwrap();

        assert_eq!(profile.peak_month, 7);
        assert_eq!(profile.trough_month, 2);
        assert_eq!(profile.seasonal_range, 150.0);
        assert_eq!(profile.monthly_averages.len(), 12);
        assert!(profile.coefficient_variation.unwrap() > 10.0);
    }

    #[test]
    fn test_terms_of_trade() {
        let export_prices = monthly(2020, &[100.0, 110.0]);
        let import_prices = monthly(2020, &[100.0, 100.0]);
        let price = price_analysis(&export_prices, &import_prices).unwrap();

        assert_eq!(price.current_terms_of_trade, Some(1.1));
        assert!(price.current_terms_growth.is_none());
    }

    #[test]
    fn test_analyze_prefers_official_balance() {
        let data = SeriesSet::from([
            ("exports".to_string(), monthly(2023, &[100.0; 14])),
            ("imports".to_string(), monthly(2023, &[120.0; 14])),
            ("trade_balance".to_string(), monthly(2023, &[-70.0; 14])),
        ]);
        let analysis = agent().analyze(&data);

        assert_eq!(analysis.current_balance(), Some(-70.0));
        assert_eq!(analysis.current(HEADLINE_GROWTH), Some(0.0));
        assert!(analysis.growth_rates.contains_key("imports_mom"));
        assert!(analysis.intensity.is_some());
        assert!(analysis.price.is_none());
        assert!(analysis.seasonality.is_empty());
    }

    #[test]
    fn test_missing_imports_only_removes_dependents() {
        let data = SeriesSet::from([("exports".to_string(), monthly(2023, &[100.0; 30]))]);
        let analysis = agent().analyze(&data);

        assert!(analysis.balance.is_none());
        assert!(analysis.competitiveness.is_none());
        assert!(analysis.growth_rates.contains_key(HEADLINE_GROWTH));
        assert!(analysis.seasonality.contains_key("exports"));
    }
}
