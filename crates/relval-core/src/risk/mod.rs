//! Return-series risk statistics.
//!
//! `RiskModel` owns one periodic return series (and optionally a market
//! series of the same length) and derives every statistic from it on demand.

pub mod config;
pub mod model;

pub use config::{ReturnFrequency, RiskConfig};
pub use model::{calculate_risk_metrics, RiskMetrics, RiskMetricsInput, RiskModel};
