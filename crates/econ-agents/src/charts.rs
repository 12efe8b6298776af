//! Chart specifications and writers
//!
//! Agents describe their figures as [`ChartSpec`] values. A [`ChartWriter`]
//! decides how they are persisted; [`JsonChartWriter`] emits chart-ready
//! JSON for any plotting front end.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::series::TimeSeries;

/// How a panel's series should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Area,
    Bar,
    Histogram,
    BoxPlot,
}

/// One plotted point; `x` is an ISO date or a category label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Present observations of a time series, keyed by date
    pub fn from_series(label: impl Into<String>, series: &TimeSeries) -> Self {
        Self {
            label: label.into(),
            points: series
                .present()
                .map(|(date, y)| ChartPoint {
                    x: date.format("%Y-%m-%d").to_string(),
                    y,
                })
                .collect(),
        }
    }

    /// Category/value pairs, e.g. a bar per indicator
    pub fn from_categories<I, S>(label: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            points: items
                .into_iter()
                .map(|(x, y)| ChartPoint { x: x.into(), y })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Horizontal (or vertical, for histograms) marker such as a policy target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub label: String,
    pub value: f64,
}

impl ReferenceLine {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A single plot area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPanel {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
    pub reference_lines: Vec<ReferenceLine>,
}

impl ChartPanel {
    pub fn new(title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            title: title.into(),
            kind,
            x_label: "Date".to_string(),
            y_label: String::new(),
            series: Vec::new(),
            reference_lines: Vec::new(),
        }
    }

    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    /// Add a series; empty series are skipped
    pub fn series(mut self, series: ChartSeries) -> Self {
        if !series.is_empty() {
            self.series.push(series);
        }
        self
    }

    pub fn reference(mut self, line: ReferenceLine) -> Self {
        self.reference_lines.push(line);
        self
    }

    pub fn has_data(&self) -> bool {
        !self.series.is_empty()
    }
}

/// A titled figure made of one or more panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub panels: Vec<ChartPanel>,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            panels: Vec::new(),
        }
    }

    pub fn panel(mut self, panel: ChartPanel) -> Self {
        self.panels.push(panel);
        self
    }

    /// True when no panel has anything to draw
    pub fn is_empty(&self) -> bool {
        !self.panels.iter().any(ChartPanel::has_data)
    }
}

/// Persists chart specifications
pub trait ChartWriter: Send + Sync {
    /// Write `spec` for `agent` under the base `name`; returns the written path
    fn write(&self, agent: &str, name: &str, spec: &ChartSpec) -> Result<PathBuf>;
}

/// Writes `<dir>/<agent>_<name>.json`
#[derive(Debug, Clone)]
pub struct JsonChartWriter {
    dir: PathBuf,
}

impl JsonChartWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ChartWriter for JsonChartWriter {
    fn write(&self, agent: &str, name: &str, spec: &ChartSpec) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{agent}_{name}.json"));
        let json = serde_json::to_string_pretty(spec)?;
        fs::write(&path, json)?;
        tracing::info!("Chart saved to {}", path.display());
        Ok(path)
    }
}
