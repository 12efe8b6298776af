//! Federal Reserve Economic Data (FRED) API client
//!
//! FRED is a database maintained by the Federal Reserve Bank of St. Louis
//! containing over 800,000 economic time series from numerous sources.
//!
//! API Key: Free registration at https://fred.stlouisfed.org/docs/api/api_key.html
//! Rate Limit: 120 requests per minute

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::DataSource;
use crate::error::{EconError, Result};
use crate::series::{Observation, TimeSeries};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

pub const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Marker FRED uses for a missing observation
const MISSING_VALUE: &str = ".";

/// Observation as returned by the API
#[derive(Debug, Clone, Deserialize)]
struct RawObservation {
    /// Date of observation (YYYY-MM-DD)
    date: String,
    /// Value ("." for missing data)
    value: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: String,
}

/// FRED API client
pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl std::fmt::Debug for FredClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FredClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FredClient {
    /// Create a new FRED client
    ///
    /// # Arguments
    /// * `api_key` - FRED API key
    /// * `rate_limit` - Requests per minute
    /// * `timeout` - Upper bound on each HTTP request
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let per_minute = NonZeroU32::new(rate_limit)
            .ok_or_else(|| EconError::ConfigError("FRED rate limit must be positive".to_string()))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: FRED_BASE_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
        })
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get observations for a series between two dates, oldest first
    pub async fn get_observations(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries> {
        self.rate_limiter.until_ready().await;

        let params = [
            ("series_id", series_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
            ("sort_order", "asc".to_string()),
            ("observation_start", start.format("%Y-%m-%d").to_string()),
            ("observation_end", end.format("%Y-%m-%d").to_string()),
        ];

        let url = format!("{}/series/observations", self.base_url);
        tracing::debug!(series_id, %start, %end, "Requesting FRED observations");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| EconError::ApiError(format!("FRED request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(series_id, status, &body));
        }

        let data: ObservationsResponse = response
            .json()
            .await
            .map_err(|e| EconError::ApiError(format!("Failed to parse FRED response: {e}")))?;

        parse_observations(data.observations)
    }
}

#[async_trait]
impl DataSource for FredClient {
    async fn get_series(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries> {
        self.get_observations(series_id, start, end).await
    }
}

/// Error for a non-success response, preferring FRED's own message
fn api_error(series_id: &str, status: StatusCode, body: &str) -> EconError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error_message)
        .unwrap_or_else(|_| status.to_string());
    EconError::ApiError(format!("FRED API error for {series_id}: {detail}"))
}

fn parse_observations(raw: Vec<RawObservation>) -> Result<TimeSeries> {
    let points = raw
        .into_iter()
        .map(|obs| {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
                .map_err(|e| EconError::ApiError(format!("Invalid observation date '{}': {e}", obs.date)))?;
            let value = if obs.value == MISSING_VALUE {
                None
            } else {
                obs.value.trim().parse::<f64>().ok()
            };
            Ok(Observation::new(date, value))
        })
        .collect::<Result<Vec<_>>>()?;

    TimeSeries::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, value: &str) -> RawObservation {
        RawObservation {
            date: date.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = FredClient::new("test_key", 120, Duration::from_secs(30)).unwrap();
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.base_url, FRED_BASE_URL);
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let result = FredClient::new("test_key", 0, Duration::from_secs(30));
        assert!(matches!(result, Err(EconError::ConfigError(_))));
    }

    #[test]
    fn test_parse_missing_marker() {
        let series = parse_observations(vec![
            raw("2024-01-01", "308.417"),
            raw("2024-02-01", "."),
            raw("2024-03-01", "310.326"),
        ])
        .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.count_present(), 2);
        assert_eq!(series.values()[1], None);
        assert_eq!(series.latest(), Some(310.326));
    }

    #[test]
    fn test_parse_invalid_date() {
        let result = parse_observations(vec![raw("01/02/2024", "1.0")]);
        assert!(matches!(result, Err(EconError::ApiError(_))));
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{"realtime_start":"2024-05-01","observations":[{"realtime_start":"2024-05-01","date":"2023-10-01","value":"22679.255"}]}"#;
        let data: ObservationsResponse = serde_json::from_str(json).unwrap();
        let series = parse_observations(data.observations).unwrap();
        assert_eq!(series.latest(), Some(22679.255));
    }

    #[test]
    fn test_api_error_uses_fred_message() {
        let body = r#"{"error_code":400,"error_message":"Bad Request.  The series does not exist."}"#;
        let err = api_error("NOPE", StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err.to_string(),
            "API error: FRED API error for NOPE: Bad Request.  The series does not exist."
        );
    }

    #[test]
    fn test_api_error_falls_back_to_status() {
        let err = api_error("GDPC1", StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(matches!(err, EconError::ApiError(ref msg) if msg.ends_with("500 Internal Server Error")));
    }

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_get_observations() {
        let key = std::env::var("FRED_API_KEY").unwrap();
        let client = FredClient::new(key, 120, Duration::from_secs(30)).unwrap();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();

        let series = client.get_series("GDPC1", start, end).await.unwrap();
        assert!(!series.is_empty());
    }
}
