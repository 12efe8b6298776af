//! Multi-agent macroeconomic analysis
//!
//! This crate fetches macroeconomic time series from FRED and analyses them
//! through one agent per economic domain:
//!
//! - `InflationAgent`: price index rates, historical averages, volatility and trends
//! - `GdpAgent`: growth rates, business-cycle phases, deflator and productivity
//! - `TradeAgent`: trade balance, competitiveness, terms of trade and seasonality
//!
//! Each agent runs `collect -> analyze -> generate_insights -> visualize`
//! over its own series cache. The [`Orchestrator`] runs the agents
//! concurrently, synthesizes cross-domain insights and writes JSON and text
//! reports.
//!
//! # Example
//!
//! ```rust,ignore
//! use econ_agents::{EconConfig, FredClient, Orchestrator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EconConfig::from_env()?;
//!     let client = FredClient::new(config.require_api_key()?, config.rate_limit, config.request_timeout)?;
//!
//!     let orchestrator = Orchestrator::new(&config, Arc::new(client));
//!     let report = orchestrator.run_all(&config.date_range).await;
//!     println!("{}", report.summary.current_economic_state);
//!
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod api;
pub mod cache;
pub mod charts;
pub mod config;
pub mod domain;
pub mod error;
pub mod insights;
pub mod metrics;
pub mod orchestrator;
pub mod report;
pub mod series;

// Re-export main types for convenience
pub use agents::{AgentReport, AgentStatus, EconomicAgent, GdpAgent, InflationAgent, TradeAgent, build_agent};
pub use api::{DataSource, FredClient};
pub use cache::{FetchOutcome, SeriesCache};
pub use config::{DateRange, EconConfig};
pub use domain::Domain;
pub use error::{EconError, Result};
pub use insights::InsightBundle;
pub use orchestrator::{ComprehensiveReport, Orchestrator};
pub use report::ReportWriter;
pub use series::{Observation, TimeSeries};
