//! Fire Risk Assessment Engine
//!
//! Scores fire and explosion risk for fuel-storage sites from sensor readings:
//! - Fuel-specific gas and temperature thresholds
//! - Rolling trend analysis over recent readings
//! - Weather-driven vapor dispersion correction

mod assessment;
mod engine;
mod fuel;
mod reading;
mod stats;
mod trend;
mod weather;

pub use assessment::{RiskAssessment, RiskLevel};
pub use engine::RiskAssessmentEngine;
pub use fuel::{FuelProperties, FuelThresholds, FuelType};
pub use reading::SensorReading;
pub use trend::{TrendAnalyzer, DEFAULT_TREND_WINDOW};
pub use weather::{DispersionFactors, WeatherImpactCalculator};

use thiserror::Error;

/// Errors raised while configuring the risk engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    /// Fuel name has no property table
    #[error("Unknown fuel type: {0}")]
    UnknownFuel(String),

    /// Threshold ordering invariant violated
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),
}
