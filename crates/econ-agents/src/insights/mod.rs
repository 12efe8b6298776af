//! Threshold rules turning analyses into human-readable insights
//!
//! Each domain has its own rule set. Rules are independent: every rule whose
//! condition holds contributes its message.

pub mod gdp;
pub mod inflation;
pub mod trade;

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Assessment labels shared between agents and the orchestrator
pub mod keys {
    pub const GROWTH_STATUS: &str = "growth_status";
    pub const BUSINESS_CYCLE_PHASE: &str = "business_cycle_phase";
    pub const RECESSION_RISK: &str = "recession_risk";
    pub const BALANCE_STATUS: &str = "balance_status";
    pub const HISTORICAL_COMPETITIVENESS: &str = "historical_competitiveness";
    pub const CURRENT_HEADLINE_INFLATION: &str = "current_headline_inflation";
    pub const DISTANCE_FROM_FED_TARGET: &str = "distance_from_fed_target";
}

/// Ordered label to formatted value list
///
/// Serialized as a JSON object that keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary(Vec<(String, String)>);

impl Summary {
    /// Insert or replace; a replaced entry keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Insights produced by one agent
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct InsightBundle {
    pub summary: Summary,
    pub alerts: Vec<String>,
    pub observations: Vec<String>,
    pub assessment: BTreeMap<String, String>,
}

impl InsightBundle {
    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn observe(&mut self, message: impl Into<String>) {
        self.observations.push(message.into());
    }

    pub fn assess(&mut self, key: &str, value: impl ToString) {
        self.assessment.insert(key.to_string(), value.to_string());
    }

    pub fn assessment(&self, key: &str) -> Option<&str> {
        self.assessment.get(key).map(String::as_str)
    }
}

/// Recession risk derived from growth, cycle phase and recent direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum RecessionRisk {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RecessionRisk {
    pub fn from_score(score: u32) -> Self {
        match score {
            0 => Self::VeryLow,
            1 => Self::Low,
            2 => Self::Moderate,
            3 | 4 => Self::High,
            _ => Self::VeryHigh,
        }
    }
}

impl fmt::Display for RecessionRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        })
    }
}

/// Economy-wide risk level from the cross-domain risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum RiskLevel {
    Low,
    #[serde(rename = "Medium-Low")]
    MediumLow,
    Medium,
    #[serde(rename = "Medium-High")]
    MediumHigh,
    High,
}

impl RiskLevel {
    pub fn from_score(score: i64) -> Self {
        match score {
            3.. => Self::High,
            1..=2 => Self::MediumHigh,
            -1..=0 => Self::Medium,
            -3..=-2 => Self::MediumLow,
            _ => Self::Low,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::MediumLow => "Medium-Low",
            Self::Medium => "Medium",
            Self::MediumHigh => "Medium-High",
            Self::High => "High",
        })
    }
}

/// `core_cpi_rate` -> `Core Cpi`
pub fn readable_name(name: &str) -> String {
    name.trim_end_matches("_rate")
        .split('_')
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `growth_status` -> `Growth Status`
pub fn readable_key(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_keeps_order() {
        let mut summary = Summary::default();
        summary.insert("b", "2");
        summary.insert("a", "1");
        summary.insert("b", "3");

        let keys: Vec<_> = summary.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(summary.get("b"), Some("3"));

        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"b":"3","a":"1"}"#);
    }

    #[test]
    fn test_recession_risk_bands() {
        assert_eq!(RecessionRisk::from_score(0), RecessionRisk::VeryLow);
        assert_eq!(RecessionRisk::from_score(2), RecessionRisk::Moderate);
        assert_eq!(RecessionRisk::from_score(4), RecessionRisk::High);
        assert_eq!(RecessionRisk::from_score(6).to_string(), "Very High");
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_score(5), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(1), RiskLevel::MediumHigh);
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(-1), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(-3), RiskLevel::MediumLow);
        assert_eq!(RiskLevel::from_score(-4).to_string(), "Low");
    }

    #[test]
    fn test_readable_names() {
        assert_eq!(readable_name("core_cpi_rate"), "Core Cpi");
        assert_eq!(readable_name("exports"), "Exports");
        assert_eq!(readable_key("current_gdp_growth"), "Current Gdp Growth");
    }
}
