//! Shared utilities for the economic analysis workspace
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and environment-driven configuration helpers.

pub mod config;
pub mod logging;

pub use config::{LogConfig, LogFormat, env_lookup, non_empty};
pub use logging::init_tracing;
