//! Per-agent memoization of upstream series fetches

use std::sync::Arc;

use cached::{Cached, UnboundCache};
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::api::DataSource;
use crate::series::TimeSeries;

/// Cache key: external series id plus the requested date range
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub series_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SeriesKey {
    pub fn new(series_id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            series_id: series_id.into(),
            start,
            end,
        }
    }
}

/// Result of asking the cache for a series
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Source returned at least one observation
    Data(TimeSeries),
    /// Source answered but had nothing in the requested range
    NoData,
    /// Source errored; never cached
    Failed { reason: String },
}

impl FetchOutcome {
    pub fn into_series(self) -> Option<TimeSeries> {
        match self {
            Self::Data(series) => Some(series),
            Self::NoData | Self::Failed { .. } => None,
        }
    }
}

/// Thread-safe cache in front of a [`DataSource`]
///
/// Entries live until [`SeriesCache::clear`] is called.
#[derive(Clone)]
pub struct SeriesCache {
    source: Arc<dyn DataSource>,
    cache: Arc<RwLock<UnboundCache<SeriesKey, TimeSeries>>>,
}

impl SeriesCache {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            cache: Arc::new(RwLock::new(UnboundCache::new())),
        }
    }

    /// Return the cached series for `(id, start, end)` or fetch it
    pub async fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> FetchOutcome {
        let key = SeriesKey::new(series_id, start, end);

        {
            let mut cache = self.cache.write().await;
            if let Some(series) = cache.cache_get(&key) {
                tracing::debug!("Cache hit for {series_id} ({start} to {end})");
                return outcome_for(series.clone());
            }
        }

        tracing::debug!("Cache miss for {series_id} ({start} to {end})");

        match self.source.get_series(series_id, start, end).await {
            Ok(series) => {
                let mut cache = self.cache.write().await;
                let _ = cache.cache_set(key, series.clone());
                outcome_for(series)
            }
            Err(e) => {
                tracing::error!("Error fetching data for {series_id}: {e}");
                FetchOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn outcome_for(series: TimeSeries) -> FetchOutcome {
    if series.is_empty() {
        FetchOutcome::NoData
    } else {
        FetchOutcome::Data(series)
    }
}
