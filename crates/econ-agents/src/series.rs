//! Labeled time series with optional values

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EconError, Result};

/// A single dated observation; `None` marks a missing value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// Ordered observations with strictly increasing dates
///
/// Once built a series is never mutated; every transformation returns a
/// new series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct TimeSeries {
    points: Vec<Observation>,
}

impl TryFrom<Vec<Observation>> for TimeSeries {
    type Error = EconError;

    fn try_from(points: Vec<Observation>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<TimeSeries> for Vec<Observation> {
    fn from(series: TimeSeries) -> Self {
        series.points
    }
}

impl TimeSeries {
    /// Build a series, rejecting duplicate or out-of-order dates
    pub fn new(points: Vec<Observation>) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(EconError::InvalidSeries(format!(
                "dates must be strictly increasing ({} then {})",
                pair[0].date, pair[1].date
            )));
        }
        // Non-finite values are treated as missing
        let points = points
            .into_iter()
            .map(|p| Observation::new(p.date, p.value.filter(|v| v.is_finite())))
            .collect();
        Ok(Self { points })
    }

    /// Build a fully populated series from `(date, value)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| Observation::new(date, Some(value)))
                .collect(),
        )
    }

    /// Build from dates and values known to be aligned by position
    ///
    /// Only used internally where dates come from an existing series.
    pub(crate) fn from_parts(dates: &[NaiveDate], values: Vec<Option<f64>>) -> Self {
        let points = dates
            .iter()
            .zip(values)
            .map(|(date, value)| Observation::new(*date, value.filter(|v| v.is_finite())))
            .collect();
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Iterate over non-missing `(date, value)` pairs
    pub fn present(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.date, v)))
    }

    /// Non-missing values in date order
    pub fn present_values(&self) -> Vec<f64> {
        self.present().map(|(_, v)| v).collect()
    }

    pub fn count_present(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }

    /// Copy without missing observations
    pub fn dropna(&self) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| p.value.is_some())
                .copied()
                .collect(),
        }
    }

    /// Latest non-missing observation
    pub fn latest_point(&self) -> Option<(NaiveDate, f64)> {
        self.points
            .iter()
            .rev()
            .find_map(|p| p.value.map(|v| (p.date, v)))
    }

    /// Latest non-missing value
    pub fn latest(&self) -> Option<f64> {
        self.latest_point().map(|(_, v)| v)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Last `n` observations
    pub fn tail(&self, n: usize) -> Self {
        let start = self.points.len().saturating_sub(n);
        Self {
            points: self.points[start..].to_vec(),
        }
    }

    /// First `n` observations
    pub fn head(&self, n: usize) -> Self {
        Self {
            points: self.points.iter().take(n).copied().collect(),
        }
    }

    /// Apply `f` to every present value; results that are not finite become missing
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            points: self
                .points
                .iter()
                .map(|p| Observation::new(p.date, p.value.map(&f).filter(|v| v.is_finite())))
                .collect(),
        }
    }

    /// Combine two series over the intersection of their dates
    ///
    /// A point is present only when both operands are present and `f`
    /// yields a finite number.
    pub fn zip_with<F>(&self, other: &Self, f: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut points = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.points.len() && j < other.points.len() {
            let (a, b) = (self.points[i], other.points[j]);
            match a.date.cmp(&b.date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    let value = match (a.value, b.value) {
                        (Some(x), Some(y)) => Some(f(x, y)).filter(|v| v.is_finite()),
                        _ => None,
                    };
                    points.push(Observation::new(a.date, value));
                    i += 1;
                    j += 1;
                }
            }
        }
        Self { points }
    }

    /// Present value pairs on dates where both series are present
    pub fn aligned_pairs(&self, other: &Self) -> Vec<(NaiveDate, f64, f64)> {
        let left = self.dropna();
        let right = other.dropna();
        let mut pairs = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < left.points.len() && j < right.points.len() {
            let (a, b) = (left.points[i], right.points[j]);
            match a.date.cmp(&b.date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    if let (Some(x), Some(y)) = (a.value, b.value) {
                        pairs.push((a.date, x, y));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        pairs
    }

    /// Sampling frequency inferred from the median spacing of dates
    pub fn frequency(&self) -> Option<Frequency> {
        Frequency::infer(self)
    }
}

/// Native sampling frequency of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// Number of observations in one year
    pub fn periods_per_year(self) -> usize {
        match self {
            Self::Daily => 252,
            Self::Weekly => 52,
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Annual => 1,
        }
    }

    /// Infer from the median gap in days between consecutive dates
    pub fn infer(series: &TimeSeries) -> Option<Self> {
        let mut gaps: Vec<i64> = series
            .points
            .windows(2)
            .map(|w| (w[1].date - w[0].date).num_days())
            .collect();
        if gaps.is_empty() {
            return None;
        }
        gaps.sort_unstable();
        let median = gaps[gaps.len() / 2];

        Some(match median {
            ..=4 => Self::Daily,
            5..=10 => Self::Weekly,
            11..=45 => Self::Monthly,
            46..=135 => Self::Quarterly,
            _ => Self::Annual,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    /// Monthly series starting January of `year`
    pub fn monthly(year: i32, values: &[f64]) -> TimeSeries {
        monthly_opt(year, &values.iter().copied().map(Some).collect::<Vec<_>>())
    }

    pub fn monthly_opt(year: i32, values: &[Option<f64>]) -> TimeSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let y = year + (i / 12) as i32;
                let m = (i % 12) as u32 + 1;
                Observation::new(date(y, m, 1), *v)
            })
            .collect();
        TimeSeries::new(points).expect("monotonic dates")
    }

    /// Quarterly series starting Q1 of `year`
    pub fn quarterly(year: i32, values: &[f64]) -> TimeSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let y = year + (i / 4) as i32;
                let m = (i % 4) as u32 * 3 + 1;
                Observation::new(date(y, m, 1), Some(*v))
            })
            .collect();
        TimeSeries::new(points).expect("monotonic dates")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_rejects_unordered_dates() {
        let points = vec![
            Observation::new(date(2024, 2, 1), Some(1.0)),
            Observation::new(date(2024, 1, 1), Some(2.0)),
        ];
        assert!(TimeSeries::new(points).is_err());

        let dup = vec![
            Observation::new(date(2024, 1, 1), Some(1.0)),
            Observation::new(date(2024, 1, 1), Some(2.0)),
        ];
        assert!(TimeSeries::new(dup).is_err());
    }

    #[test]
    fn test_nan_becomes_missing() {
        let series = TimeSeries::from_pairs([(date(2024, 1, 1), f64::NAN)]).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.count_present(), 0);
    }

    #[test]
    fn test_latest_skips_missing() {
        let series = monthly_opt(2024, &[Some(1.0), Some(2.0), None]);
        assert_eq!(series.latest(), Some(2.0));
        assert_eq!(series.latest_point(), Some((date(2024, 2, 1), 2.0)));
        assert_eq!(TimeSeries::empty().latest(), None);
    }

    #[test]
    fn test_zip_with_uses_intersection() {
        let a = monthly(2024, &[1.0, 2.0, 3.0]);
        let b = TimeSeries::from_pairs([(date(2024, 2, 1), 10.0), (date(2024, 3, 1), 20.0), (date(2024, 4, 1), 30.0)])
            .unwrap();

        let sum = a.zip_with(&b, |x, y| x + y);
        assert_eq!(sum.dates(), vec![date(2024, 2, 1), date(2024, 3, 1)]);
        assert_eq!(sum.values(), vec![Some(12.0), Some(23.0)]);
    }

    #[test]
    fn test_zip_with_division_by_zero_is_missing() {
        let a = monthly(2024, &[1.0]);
        let b = monthly(2024, &[0.0]);
        assert_eq!(a.zip_with(&b, |x, y| x / y).values(), vec![None]);
    }

    #[test]
    fn test_tail_and_head() {
        let series = monthly(2024, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.tail(2).present_values(), vec![3.0, 4.0]);
        assert_eq!(series.tail(10).len(), 4);
        assert_eq!(series.head(1).present_values(), vec![1.0]);
    }

    #[test]
    fn test_frequency_inference() {
        assert_eq!(monthly(2020, &[1.0; 6]).frequency(), Some(Frequency::Monthly));
        assert_eq!(quarterly(2020, &[1.0; 6]).frequency(), Some(Frequency::Quarterly));
        assert_eq!(monthly(2020, &[1.0]).frequency(), None);
        assert_eq!(Frequency::Daily.periods_per_year(), 252);
    }

    #[test]
    fn test_serde_validates_order() {
        let json = r#"[{"date":"2024-02-01","value":1.0},{"date":"2024-01-01","value":null}]"#;
        assert!(serde_json::from_str::<TimeSeries>(json).is_err());

        let series = monthly_opt(2024, &[Some(1.5), None]);
        let text = serde_json::to_string(&series).unwrap();
        let back: TimeSeries = serde_json::from_str(&text).unwrap();
        assert_eq!(back, series);
    }
}
