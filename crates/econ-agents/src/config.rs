//! Configuration for economic analysis runs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use econ_utils::{env_lookup, non_empty};
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{EconError, Result};

/// Value shipped in sample configuration; treated the same as no key
pub const API_KEY_PLACEHOLDER: &str = "YOUR_FRED_API_KEY_HERE";

/// Default look-back when no start date is configured
pub const DEFAULT_LOOKBACK_DAYS: u64 = 3650;

/// Inclusive range of observation dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(EconError::ConfigError(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` days up to and including `end`
    pub fn trailing(end: NaiveDate, days: u64) -> Self {
        let start = end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }
}

/// An indicator name mapped to its FRED series id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub name: String,
    pub series_id: String,
}

impl SeriesSpec {
    pub fn new(name: impl Into<String>, series_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            series_id: series_id.into(),
        }
    }
}

/// The static indicator catalog, grouped by domain
pub fn default_catalog() -> BTreeMap<Domain, Vec<SeriesSpec>> {
    BTreeMap::from([
        (
            Domain::Inflation,
            vec![
                // Consumer Price Index for All Urban Consumers
                SeriesSpec::new("cpi_all", "CPIAUCSL"),
                SeriesSpec::new("core_cpi", "CPILFESL"),
                SeriesSpec::new("pce", "PCEPI"),
                // Fed's preferred inflation measure
                SeriesSpec::new("core_pce", "PCEPILFE"),
                SeriesSpec::new("producer_price", "PPIACO"),
            ],
        ),
        (
            Domain::Gdp,
            vec![
                SeriesSpec::new("real_gdp", "GDPC1"),
                SeriesSpec::new("nominal_gdp", "GDP"),
                SeriesSpec::new("gdp_growth", "A191RL1Q225SBEA"),
                SeriesSpec::new("gdp_per_capita", "A939RX0Q048SBEA"),
                SeriesSpec::new("gdp_deflator", "GDPDEF"),
            ],
        ),
        (
            Domain::Trade,
            vec![
                SeriesSpec::new("exports", "EXPGS"),
                SeriesSpec::new("imports", "IMPGS"),
                SeriesSpec::new("trade_balance", "BOPGSTB"),
                SeriesSpec::new("export_price_index", "EXPGSC1"),
                SeriesSpec::new("import_price_index", "IMPGSC1"),
            ],
        ),
    ])
}

/// A trailing window used for historical averages, e.g. `5Y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnalysisWindow {
    pub years: u32,
}

impl AnalysisWindow {
    pub const fn years(years: u32) -> Self {
        Self { years }
    }

    pub fn label(self) -> String {
        format!("{}Y", self.years)
    }
}

impl std::str::FromStr for AnalysisWindow {
    type Err = EconError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let years = trimmed
            .strip_suffix(['Y', 'y'])
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| EconError::ConfigError(format!("invalid analysis window '{trimmed}'")))?;
        Ok(Self { years })
    }
}

impl TryFrom<String> for AnalysisWindow {
    type Error = EconError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AnalysisWindow> for String {
    fn from(window: AnalysisWindow) -> Self {
        window.label()
    }
}

/// Configuration for economic analysis runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconConfig {
    /// FRED API key; `None` when unset or left at the placeholder
    #[serde(skip_serializing)]
    pub fred_api_key: Option<String>,

    /// Observation range requested from the data source
    pub date_range: DateRange,

    /// Indicators fetched per domain, in collection order
    pub catalog: BTreeMap<Domain, Vec<SeriesSpec>>,

    /// Trailing windows for historical averages
    pub analysis_windows: Vec<AnalysisWindow>,

    /// Minimum |r| for a cross-domain correlation to be reported as an insight
    pub correlation_threshold: f64,

    /// Minimum overlapping observations before a correlation is computed
    pub min_correlation_observations: usize,

    /// Rolling window for volatility series
    pub volatility_window: usize,

    /// Root directory for charts and reports
    pub output_dir: PathBuf,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// FRED requests per minute
    pub rate_limit: u32,

    /// Whether agents write chart specs
    pub write_charts: bool,
}

impl Default for EconConfig {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            date_range: DateRange::trailing(Utc::now().date_naive(), DEFAULT_LOOKBACK_DAYS),
            catalog: default_catalog(),
            analysis_windows: vec![
                AnalysisWindow::years(1),
                AnalysisWindow::years(3),
                AnalysisWindow::years(5),
                AnalysisWindow::years(10),
            ],
            correlation_threshold: 0.7,
            min_correlation_observations: 8,
            volatility_window: 12,
            output_dir: PathBuf::from("output"),
            request_timeout: Duration::from_secs(30),
            rate_limit: 120,
            write_charts: true,
        }
    }
}

impl EconConfig {
    /// Create a new configuration builder
    pub fn builder() -> EconConfigBuilder {
        EconConfigBuilder::default()
    }

    /// Load from the process environment
    ///
    /// Reads `FRED_API_KEY`, `ECON_OUTPUT_DIR`, `ECON_START_DATE` and
    /// `ECON_END_DATE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup, Utc::now().date_naive())
    }

    /// Load from an arbitrary variable lookup with `today` as the default end date
    pub fn from_lookup<F>(lookup: F, today: NaiveDate) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(key) = lookup("FRED_API_KEY").and_then(non_empty) {
            builder = builder.fred_api_key(key);
        }
        if let Some(dir) = lookup("ECON_OUTPUT_DIR").and_then(non_empty) {
            builder = builder.output_dir(dir);
        }

        let end = parse_date_var(&lookup, "ECON_END_DATE")?.unwrap_or(today);
        let start = parse_date_var(&lookup, "ECON_START_DATE")?
            .unwrap_or_else(|| DateRange::trailing(end, DEFAULT_LOOKBACK_DAYS).start);

        builder.date_range(DateRange::new(start, end)?).build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.date_range.start > self.date_range.end {
            return Err(EconError::ConfigError(
                "date range start must not be after its end".to_string(),
            ));
        }

        if !(self.correlation_threshold > 0.0 && self.correlation_threshold <= 1.0) {
            return Err(EconError::ConfigError(
                "correlation_threshold must be in (0, 1]".to_string(),
            ));
        }

        if self.min_correlation_observations < 3 {
            return Err(EconError::ConfigError(
                "min_correlation_observations must be at least 3".to_string(),
            ));
        }

        if self.volatility_window < 2 {
            return Err(EconError::ConfigError(
                "volatility_window must be at least 2".to_string(),
            ));
        }

        if self.analysis_windows.is_empty() {
            return Err(EconError::ConfigError(
                "at least one analysis window is required".to_string(),
            ));
        }

        if self.rate_limit == 0 {
            return Err(EconError::ConfigError(
                "rate_limit must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(EconError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if let Some(spec) = self
            .catalog
            .values()
            .flatten()
            .find(|s| s.name.is_empty() || s.series_id.is_empty())
        {
            return Err(EconError::ConfigError(format!(
                "catalog entry '{}' has an empty name or series id",
                spec.name
            )));
        }

        Ok(())
    }

    /// The API key, or an error when it is missing
    pub fn require_api_key(&self) -> Result<&str> {
        self.fred_api_key.as_deref().ok_or_else(|| {
            EconError::ConfigError(
                "FRED_API_KEY is not set. Get a free key at https://fred.stlouisfed.org/docs/api/api_key.html"
                    .to_string(),
            )
        })
    }

    /// Indicators for one domain
    pub fn series_for(&self, domain: Domain) -> &[SeriesSpec] {
        self.catalog.get(&domain).map_or(&[], Vec::as_slice)
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join("charts")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join("reports")
    }

    /// Where agents export their collected series as CSV
    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join("data")
    }
}

fn parse_date_var<F>(lookup: &F, key: &str) -> Result<Option<NaiveDate>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(non_empty)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|e| EconError::ConfigError(format!("{key} must be YYYY-MM-DD, got '{raw}': {e}")))
        })
        .transpose()
}

/// Builder for EconConfig
#[derive(Debug, Default)]
pub struct EconConfigBuilder {
    fred_api_key: Option<String>,
    date_range: Option<DateRange>,
    catalog: Option<BTreeMap<Domain, Vec<SeriesSpec>>>,
    analysis_windows: Option<Vec<AnalysisWindow>>,
    correlation_threshold: Option<f64>,
    min_correlation_observations: Option<usize>,
    volatility_window: Option<usize>,
    output_dir: Option<PathBuf>,
    request_timeout: Option<Duration>,
    rate_limit: Option<u32>,
    write_charts: Option<bool>,
}

impl EconConfigBuilder {
    /// Set the FRED API key; the sample placeholder is ignored
    pub fn fred_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.fred_api_key = non_empty(key).filter(|k| k != API_KEY_PLACEHOLDER);
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn catalog(mut self, catalog: BTreeMap<Domain, Vec<SeriesSpec>>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn analysis_windows(mut self, windows: Vec<AnalysisWindow>) -> Self {
        self.analysis_windows = Some(windows);
        self
    }

    pub fn correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = Some(threshold);
        self
    }

    pub fn min_correlation_observations(mut self, count: usize) -> Self {
        self.min_correlation_observations = Some(count);
        self
    }

    pub fn volatility_window(mut self, window: usize) -> Self {
        self.volatility_window = Some(window);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit = Some(per_minute);
        self
    }

    pub fn write_charts(mut self, enabled: bool) -> Self {
        self.write_charts = Some(enabled);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EconConfig> {
        let defaults = EconConfig::default();

        let config = EconConfig {
            fred_api_key: self.fred_api_key,
            date_range: self.date_range.unwrap_or(defaults.date_range),
            catalog: self.catalog.unwrap_or(defaults.catalog),
            analysis_windows: self.analysis_windows.unwrap_or(defaults.analysis_windows),
            correlation_threshold: self.correlation_threshold.unwrap_or(defaults.correlation_threshold),
            min_correlation_observations: self
                .min_correlation_observations
                .unwrap_or(defaults.min_correlation_observations),
            volatility_window: self.volatility_window.unwrap_or(defaults.volatility_window),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit: self.rate_limit.unwrap_or(defaults.rate_limit),
            write_charts: self.write_charts.unwrap_or(defaults.write_charts),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lookup_from(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |k| vars.get(k).map(|v| (*v).to_string())
    }

    #[test]
    fn test_default_config() {
        let config = EconConfig::default();
        assert_eq!(config.volatility_window, 12);
        assert_eq!(config.correlation_threshold, 0.7);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.series_for(Domain::Gdp).len(), 5);
        assert!(config.validate().is_ok());
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_default_range_is_ten_years() {
        let config = EconConfig::from_lookup(|_| None, date(2024, 6, 1)).unwrap();
        assert_eq!(config.date_range.end, date(2024, 6, 1));
        assert_eq!((config.date_range.end - config.date_range.start).num_days(), 3650);
    }

    #[test]
    fn test_from_lookup() {
        let lookup = lookup_from(&[
            ("FRED_API_KEY", "abc123"),
            ("ECON_OUTPUT_DIR", "/tmp/econ"),
            ("ECON_START_DATE", "2015-01-01"),
            ("ECON_END_DATE", "2020-12-31"),
        ]);
        let config = EconConfig::from_lookup(lookup, date(2024, 6, 1)).unwrap();

        assert_eq!(config.require_api_key().unwrap(), "abc123");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/econ"));
        assert_eq!(config.date_range, DateRange::new(date(2015, 1, 1), date(2020, 12, 31)).unwrap());
        assert_eq!(config.reports_dir(), PathBuf::from("/tmp/econ/reports"));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/econ/data"));
    }

    #[test]
    fn test_placeholder_key_is_missing() {
        let lookup = lookup_from(&[("FRED_API_KEY", API_KEY_PLACEHOLDER)]);
        let config = EconConfig::from_lookup(lookup, date(2024, 6, 1)).unwrap();
        assert!(config.fred_api_key.is_none());
    }

    #[test]
    fn test_invalid_dates_rejected() {
        let bad_format = lookup_from(&[("ECON_START_DATE", "01/01/2020")]);
        assert!(EconConfig::from_lookup(bad_format, date(2024, 6, 1)).is_err());

        let reversed = lookup_from(&[("ECON_START_DATE", "2024-01-01"), ("ECON_END_DATE", "2023-01-01")]);
        assert!(EconConfig::from_lookup(reversed, date(2024, 6, 1)).is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = EconConfig::builder()
            .volatility_window(6)
            .correlation_threshold(0.5)
            .write_charts(false)
            .build()
            .unwrap();

        assert_eq!(config.volatility_window, 6);
        assert_eq!(config.correlation_threshold, 0.5);
        assert!(!config.write_charts);
    }

    #[test]
    fn test_validation_failures() {
        assert!(EconConfig::builder().correlation_threshold(1.5).build().is_err());
        assert!(EconConfig::builder().volatility_window(1).build().is_err());
        assert!(EconConfig::builder().rate_limit(0).build().is_err());
        assert!(EconConfig::builder().analysis_windows(vec![]).build().is_err());
        assert!(EconConfig::builder().request_timeout(Duration::ZERO).build().is_err());
    }

    #[test]
    fn test_analysis_window_parsing() {
        assert_eq!("5Y".parse::<AnalysisWindow>().unwrap(), AnalysisWindow::years(5));
        assert_eq!(AnalysisWindow::years(10).label(), "10Y");
        assert!("0Y".parse::<AnalysisWindow>().is_err());
        assert!("5M".parse::<AnalysisWindow>().is_err());
    }
}
