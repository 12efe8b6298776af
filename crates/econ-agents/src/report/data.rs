use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::agents::SeriesSet;
use crate::domain::Domain;
use crate::error::Result;

/// Exports an agent's collected series as `<agent>_<domain>_data.csv`
///
/// One row per date across all series, one column per indicator. Dates a
/// series does not cover, and its missing values, are left blank.
#[derive(Debug, Clone)]
pub struct DataWriter {
    dir: PathBuf,
}

impl DataWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_series_set(&self, agent: &str, domain: Domain, data: &SeriesSet) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{agent}_{}_data.csv", domain.key()));

        let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
        for (column, series) in data.values().enumerate() {
            for point in series.points() {
                rows.entry(point.date).or_insert_with(|| vec![None; data.len()])[column] = point.value;
            }
        }

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(std::iter::once("date").chain(data.keys().map(String::as_str)))?;
        for (date, values) in rows {
            let mut record = vec![date.format("%Y-%m-%d").to_string()];
            record.extend(values.into_iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        tracing::info!("Data saved to {}", path.display());
        Ok(path)
    }
}
