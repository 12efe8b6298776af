//! Derived metrics over [`TimeSeries`]
//!
//! Every function here is pure. A derived point is missing whenever one of
//! its inputs is missing or the arithmetic would divide by zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};

use crate::series::{Frequency, TimeSeries};

/// Descriptive statistics over the present values of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; absent for a single value
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub latest: f64,
    pub count: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Percent change over `periods` observations
///
/// `(v[t] / v[t - periods] - 1) * 100`. The first `periods` points are
/// always missing.
pub fn growth_rate(series: &TimeSeries, periods: usize) -> TimeSeries {
    let values = series.values();
    let growth = (0..values.len())
        .map(|t| {
            if periods == 0 || t < periods {
                return None;
            }
            match (values[t], values[t - periods]) {
                (Some(current), Some(base)) if base != 0.0 => Some((current / base - 1.0) * 100.0),
                _ => None,
            }
        })
        .collect();
    TimeSeries::from_parts(&series.dates(), growth)
}

/// Growth over `periods` multiplied by `scale`
///
/// Used for annualized period-over-period rates (QoQ x 4, MoM x 12).
pub fn scaled_growth(series: &TimeSeries, periods: usize, scale: f64) -> TimeSeries {
    growth_rate(series, periods).map(|v| v * scale)
}

/// Trailing mean over `window` observations
pub fn moving_average(series: &TimeSeries, window: usize) -> TimeSeries {
    let values = series.values();
    let averages = (0..values.len())
        .map(|t| {
            if window == 0 || t + 1 < window {
                return None;
            }
            let slice = &values[t + 1 - window..=t];
            let present: Option<Vec<f64>> = slice.iter().copied().collect();
            present.map(|v| v.iter().sum::<f64>() / window as f64)
        })
        .collect();
    TimeSeries::from_parts(&series.dates(), averages)
}

/// Period-over-period fractional change, `v[t] / v[t-1] - 1`
pub fn fractional_change(series: &TimeSeries) -> TimeSeries {
    growth_rate(series, 1).map(|v| v / 100.0)
}

/// Rolling sample standard deviation of fractional change, annualized
///
/// The annualization factor is `sqrt(frequency.periods_per_year())`.
pub fn volatility(series: &TimeSeries, window: usize, frequency: Frequency) -> TimeSeries {
    let changes = fractional_change(series).values();
    let factor = (frequency.periods_per_year() as f64).sqrt();
    let rolling = (0..changes.len())
        .map(|t| {
            if window < 2 || t + 1 < window {
                return None;
            }
            let present: Option<Vec<f64>> = changes[t + 1 - window..=t].iter().copied().collect();
            present.and_then(|v| std_dev(&v)).map(|sd| sd * factor)
        })
        .collect();
    TimeSeries::from_parts(&series.dates(), rolling)
}

/// Summary statistics over present values, `None` when there are none
pub fn summary_stats(series: &TimeSeries) -> Option<SummaryStats> {
    let present: Vec<(NaiveDate, f64)> = series.present().collect();
    let (start_date, _) = *present.first()?;
    let (end_date, latest) = *present.last()?;
    let values: Vec<f64> = present.iter().map(|(_, v)| *v).collect();

    Some(SummaryStats {
        mean: values.iter().mean(),
        median: Data::new(values.clone()).median(),
        std: std_dev(&values),
        min: Statistics::min(values.iter()),
        max: Statistics::max(values.iter()),
        latest,
        count: values.len(),
        start_date,
        end_date,
    })
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().mean())
    }
}

/// Sample standard deviation; needs at least two values
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sd = values.iter().std_dev();
    sd.is_finite().then_some(sd)
}

/// Standard deviation divided by the mean
///
/// Keeps the sign of the mean, so a series centred below zero has a
/// negative coefficient.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if m == 0.0 {
        return None;
    }
    std_dev(values).map(|sd| sd / m)
}

/// Pearson correlation over dates where both series are present
///
/// Returns the coefficient and the number of aligned observations.
pub fn correlation(a: &TimeSeries, b: &TimeSeries) -> Option<(f64, usize)> {
    let pairs = a.aligned_pairs(b);
    if pairs.len() < 2 {
        return None;
    }
    let xs: Vec<f64> = pairs.iter().map(|(_, x, _)| *x).collect();
    let ys: Vec<f64> = pairs.iter().map(|(_, _, y)| *y).collect();

    let sx = std_dev(&xs)?;
    let sy = std_dev(&ys)?;
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    let r = xs.iter().covariance(ys.iter()) / (sx * sy);
    r.is_finite().then_some((r.clamp(-1.0, 1.0), pairs.len()))
}

/// Share of present values strictly below `value`, in percent
pub fn percentile_rank(series: &TimeSeries, value: f64) -> Option<f64> {
    let values = series.present_values();
    if values.is_empty() {
        return None;
    }
    let below = values.iter().filter(|v| **v < value).count();
    Some(below as f64 / values.len() as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::test_support::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_growth_rate_basic() {
        let series = monthly(2024, &[100.0, 110.0, 121.0]);
        let growth = growth_rate(&series, 1);
        let values = growth.values();
        assert_eq!(values[0], None);
        assert!(approx(values[1].unwrap(), 10.0));
        assert!(approx(values[2].unwrap(), 10.0));
        assert_eq!(growth.len(), series.len());
    }

    #[test]
    fn test_growth_rate_periods_exceed_length() {
        let series = monthly(2024, &[1.0, 2.0, 3.0]);
        assert_eq!(growth_rate(&series, 3).count_present(), 0);
        assert_eq!(growth_rate(&series, 12).count_present(), 0);
    }

    #[test]
    fn test_growth_rate_missing_and_zero_base() {
        let series = monthly_opt(2024, &[Some(0.0), Some(5.0), None, Some(4.0)]);
        let growth = growth_rate(&series, 1).values();
        assert_eq!(growth[1], None);
        assert_eq!(growth[2], None);
        assert_eq!(growth[3], None);
    }

    #[test]
    fn test_scaled_growth() {
        let series = quarterly(2024, &[100.0, 101.0]);
        let annualized = scaled_growth(&series, 1, 4.0);
        assert!(approx(annualized.latest().unwrap(), 4.0));
    }

    #[test]
    fn test_moving_average_window() {
        let series = monthly(2024, &[1.0, 2.0, 3.0, 4.0]);
        let ma = moving_average(&series, 2).values();
        assert_eq!(ma, vec![None, Some(1.5), Some(2.5), Some(3.5)]);

        let ma3 = moving_average(&series, 3).values();
        assert_eq!(ma3, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_moving_average_gap_poisons_window() {
        let series = monthly_opt(2024, &[Some(1.0), None, Some(3.0), Some(5.0)]);
        let ma = moving_average(&series, 2).values();
        assert_eq!(ma, vec![None, None, None, Some(4.0)]);
    }

    #[test]
    fn test_summary_stats_empty() {
        assert!(summary_stats(&TimeSeries::empty()).is_none());
        assert!(summary_stats(&monthly_opt(2024, &[None, None])).is_none());
    }

    #[test]
    fn test_summary_stats_single_value() {
        let stats = summary_stats(&monthly(2024, &[3.5])).unwrap();
        assert_eq!(stats.mean, 3.5);
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.min, 3.5);
        assert_eq!(stats.max, 3.5);
        assert_eq!(stats.latest, 3.5);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.std, None);
    }

    #[test]
    fn test_summary_stats_values() {
        let series = monthly_opt(2024, &[Some(2.0), Some(4.0), None, Some(6.0)]);
        let stats = summary_stats(&series).unwrap();
        assert!(approx(stats.mean, 4.0));
        assert!(approx(stats.median, 4.0));
        assert!(approx(stats.std.unwrap(), 2.0));
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 6.0);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.start_date, date(2024, 1, 1));
        assert_eq!(stats.end_date, date(2024, 4, 1));
    }

    #[test]
    fn test_volatility_constant_growth_is_zero() {
        let values: Vec<f64> = (0..6).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let series = monthly(2024, &values);
        let vol = volatility(&series, 3, Frequency::Monthly);
        let present = vol.present_values();
        assert_eq!(present.len(), 3);
        assert!(present.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_volatility_annualization_factor() {
        let series = monthly(2024, &[100.0, 110.0, 99.0]);
        let monthly_vol = volatility(&series, 2, Frequency::Monthly).latest().unwrap();
        let annual_vol = volatility(&series, 2, Frequency::Annual).latest().unwrap();
        assert!(approx(monthly_vol / annual_vol, 12.0_f64.sqrt()));
    }

    #[test]
    fn test_correlation() {
        let a = monthly(2024, &[1.0, 2.0, 3.0, 4.0]);
        let b = monthly(2024, &[2.0, 4.0, 6.0, 8.0]);
        let (r, n) = correlation(&a, &b).unwrap();
        assert!(approx(r, 1.0));
        assert_eq!(n, 4);

        let c = monthly(2024, &[4.0, 3.0, 2.0, 1.0]);
        assert!(approx(correlation(&a, &c).unwrap().0, -1.0));

        let flat = monthly(2024, &[1.0, 1.0, 1.0, 1.0]);
        assert!(correlation(&a, &flat).is_none());
    }

    #[test]
    fn test_percentile_rank() {
        let series = monthly(2024, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(percentile_rank(&series, 3.0), Some(50.0));
        assert_eq!(percentile_rank(&series, 0.0), Some(0.0));
        assert_eq!(percentile_rank(&TimeSeries::empty(), 1.0), None);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert!(coefficient_of_variation(&[1.0, -1.0]).is_none());
        let cv = coefficient_of_variation(&[2.0, 4.0, 6.0]).unwrap();
        assert!(approx(cv, 0.5));
    }

    #[test]
    fn test_coefficient_of_variation_negative_mean() {
        let cv = coefficient_of_variation(&[-2.0, -4.0, -6.0]).unwrap();
        assert!(approx(cv, -0.5));
    }
}
