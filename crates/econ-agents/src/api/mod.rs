//! Upstream statistical data providers

pub mod fred;

pub use fred::{FRED_BASE_URL, FredClient};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::series::TimeSeries;

/// A provider of dated observations for an external series id
///
/// An empty series means the provider answered but had nothing in range.
/// Errors are reserved for transport or protocol failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn get_series(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries>;
}
