//! Trade insight rules

use super::{InsightBundle, keys, readable_key};
use crate::agents::trade::{HEADLINE_GROWTH, IMPORT_PRICE_GROWTH, IMPORTS_GROWTH, TradeAnalysis};

/// Deficit size, in billions, that raises an alert
const LARGE_DEFICIT: f64 = 50.0;
const VOLATILITY_RATIO: f64 = 1.5;
const HIGH_SEASONAL_CV: f64 = 10.0;

pub fn generate(analysis: &TradeAnalysis) -> InsightBundle {
    tracing::info!("Generating trade insights...");
    let mut insights = InsightBundle::default();

    if let Some(exports) = analysis.current("exports") {
        insights.summary.insert("current_exports", format!("${exports:.1}B"));
    }
    if let Some(imports) = analysis.current("imports") {
        insights.summary.insert("current_imports", format!("${imports:.1}B"));
    }

    if let Some(balance) = analysis.current_balance() {
        insights
            .summary
            .insert("current_trade_balance", format!("${balance:.1}B"));
        if balance < 0.0 {
            insights.assess(keys::BALANCE_STATUS, "Trade Deficit");
            if balance.abs() > LARGE_DEFICIT {
                insights.alert(format!("Large trade deficit: ${:.1}B", balance.abs()));
            }
        } else {
            insights.assess(keys::BALANCE_STATUS, "Trade Surplus");
            insights.observe(format!("Trade surplus of ${balance:.1}B"));
        }
    }

    if let Some(growth) = analysis.current(HEADLINE_GROWTH) {
        insights.summary.insert("export_growth", format!("{growth:.1}%"));
        if growth < -5.0 {
            insights.alert(format!("Sharp export decline: {growth:.1}% year-over-year"));
        } else if growth > 10.0 {
            insights.observe(format!("Strong export growth: {growth:.1}% year-over-year"));
        }
    }

    if let Some(growth) = analysis.current(IMPORTS_GROWTH) {
        insights.summary.insert("import_growth", format!("{growth:.1}%"));
        if growth < -5.0 {
            insights.observe(format!("Import decline: {growth:.1}% year-over-year"));
        } else if growth > 15.0 {
            insights.alert(format!("Rapid import growth: {growth:.1}% year-over-year"));
        }
    }

    if let Some(terms) = analysis.price.as_ref().and_then(|p| p.current_terms_growth) {
        insights
            .summary
            .insert("terms_of_trade_growth", format!("{terms:.1}%"));
        if terms > 5.0 {
            insights.observe(format!(
                "Improving terms of trade: {terms:.1}% growth (export prices rising faster than import prices)"
            ));
        } else if terms < -5.0 {
            insights.alert(format!(
                "Deteriorating terms of trade: {terms:.1}% decline (import prices rising faster than export prices)"
            ));
        }
    }

    if let Some(comp) = &analysis.competitiveness {
        if let Some(diff) = comp.current_growth_diff {
            if diff > 5.0 {
                insights.observe(format!(
                    "Export competitiveness improving: exports growing {diff:.1} pp faster than imports"
                ));
            } else if diff < -5.0 {
                insights.observe(format!(
                    "Export competitiveness declining: exports growing {:.1} pp slower than imports",
                    diff.abs()
                ));
            }
        }

        if let Some(avg) = comp.average_growth_diff {
            let label = if avg > 2.0 {
                "Generally Competitive"
            } else if avg < -2.0 {
                "Generally Less Competitive"
            } else {
                "Balanced"
            };
            insights.assess(keys::HISTORICAL_COMPETITIVENESS, label);
        }
    }

    if let Some(coverage) = analysis.current_coverage() {
        insights.summary.insert("export_coverage", format!("{coverage:.1}%"));
        if coverage < 80.0 {
            insights.alert(format!(
                "Low export coverage: exports cover only {coverage:.1}% of imports"
            ));
        } else if coverage > 120.0 {
            insights.observe(format!(
                "High export coverage: exports exceed imports by {:.1}%",
                coverage - 100.0
            ));
        }
    }

    if let Some(price_growth) = analysis.current(IMPORT_PRICE_GROWTH) {
        if price_growth > 10.0 {
            insights.alert(format!(
                "High import price inflation: {price_growth:.1}% year-over-year"
            ));
        } else if price_growth < -5.0 {
            insights.observe(format!(
                "Import price deflation: {price_growth:.1}% year-over-year"
            ));
        }
    }

    if let Some(flows) = &analysis.export_import {
        if let (Some(exports_vol), Some(imports_vol)) = (flows.exports_summary.std, flows.imports_summary.std) {
            if exports_vol > imports_vol * VOLATILITY_RATIO {
                insights.observe("Export volumes significantly more volatile than imports");
            } else if imports_vol > exports_vol * VOLATILITY_RATIO {
                insights.observe("Import volumes significantly more volatile than exports");
            }
        }
    }

    for (name, profile) in &analysis.seasonality {
        if profile.coefficient_variation.is_some_and(|cv| cv > HIGH_SEASONAL_CV) {
            insights.observe(format!(
                "{} shows high seasonality (peak: month {}, trough: month {})",
                readable_key(name),
                profile.peak_month,
                profile.trough_month
            ));
        }
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::trade::{Competitiveness, balance_analysis, seasonality};
    use crate::series::TimeSeries;
    use crate::series::test_support::monthly;

    fn with_values(values: &[(&str, f64)]) -> TradeAnalysis {
        TradeAnalysis {
            current_values: values.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_large_deficit_and_low_coverage() {
        let mut analysis = with_values(&[("exports", 150.0), ("imports", 220.0)]);
        analysis.balance = balance_analysis(&monthly(2024, &[150.0]), &monthly(2024, &[220.0]), 12);

        let insights = generate(&analysis);
        assert_eq!(insights.summary.get("current_trade_balance"), Some("$-70.0B"));
        assert_eq!(insights.summary.get("export_coverage"), Some("68.2%"));
        assert_eq!(insights.assessment(keys::BALANCE_STATUS), Some("Trade Deficit"));
        assert_eq!(
            insights.alerts,
            vec![
                "Large trade deficit: $70.0B".to_string(),
                "Low export coverage: exports cover only 68.2% of imports".to_string(),
            ]
        );
    }

    #[test]
    fn test_surplus_and_high_coverage() {
        let mut analysis = TradeAnalysis::default();
        analysis.balance = balance_analysis(&monthly(2024, &[130.0]), &monthly(2024, &[100.0]), 12);

        let insights = generate(&analysis);
        assert_eq!(insights.assessment(keys::BALANCE_STATUS), Some("Trade Surplus"));
        assert!(insights.observations.contains(&"Trade surplus of $30.0B".to_string()));
        assert!(insights.observations.contains(&"High export coverage: exports exceed imports by 30.0%".to_string()));
    }

    #[test]
    fn test_growth_rules() {
        let insights = generate(&with_values(&[
            (HEADLINE_GROWTH, -7.5),
            (IMPORTS_GROWTH, 16.0),
            (IMPORT_PRICE_GROWTH, 12.0),
        ]));
        assert_eq!(
            insights.alerts,
            vec![
                "Sharp export decline: -7.5% year-over-year".to_string(),
                "Rapid import growth: 16.0% year-over-year".to_string(),
                "High import price inflation: 12.0% year-over-year".to_string(),
            ]
        );
        assert_eq!(insights.summary.get("export_growth"), Some("-7.5%"));
    }

    #[test]
    fn test_competitiveness_rules() {
        let mut analysis = TradeAnalysis::default();
        analysis.competitiveness = Some(Competitiveness {
            growth_differential: TimeSeries::empty(),
            current_growth_diff: Some(-6.0),
            average_growth_diff: Some(2.5),
            competitiveness_trend: TimeSeries::empty(),
            export_advantage_periods: 10,
            import_advantage_periods: 2,
        });

        let insights = generate(&analysis);
        assert_eq!(
            insights.observations,
            vec!["Export competitiveness declining: exports growing 6.0 pp slower than imports".to_string()]
        );
        assert_eq!(
            insights.assessment(keys::HISTORICAL_COMPETITIVENESS),
            Some("Generally Competitive")
        );
    }

    #[test]
    fn test_seasonality_observation() {
        let values: Vec<f64> = (0..36).map(|i| if i % 12 == 11 { 300.0 } else { 100.0 }).collect();
        let mut analysis = TradeAnalysis::default();
        analysis
            .seasonality
            .insert("trade_balance".to_string(), seasonality(&monthly(2020, &values)).unwrap());

        let insights = generate(&analysis);
        assert_eq!(insights.observations.len(), 1);
        assert!(insights.observations[0].starts_with("Trade Balance shows high seasonality (peak: month 12"));
    }

    #[test]
    fn test_deficit_seasonality_is_not_flagged() {
        // Narrower deficit every December; the coefficient is negative
        let values: Vec<f64> = (0..36).map(|i| if i % 12 == 11 { -10.0 } else { -100.0 }).collect();
        let profile = seasonality(&monthly(2020, &values)).unwrap();
        assert!(profile.coefficient_variation.is_some_and(|cv| cv < -10.0));

        let mut analysis = TradeAnalysis::default();
        analysis.seasonality.insert("trade_balance".to_string(), profile);
        assert!(generate(&analysis).observations.is_empty());
    }
}
