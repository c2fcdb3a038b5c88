//! FireGuard Monitor
//!
//! Wires fuel-site sensor readings through risk assessment into alert
//! dispatch and escalation:
//! - File/environment configuration
//! - Logging initialisation
//! - Per-device monitor loop step

mod config;
mod logging;
mod monitor;

pub use config::MonitorConfig;
pub use logging::init_logging;
pub use monitor::{Monitor, MonitorOutcome};

pub use alerting;
pub use risk_engine;

use thiserror::Error;

/// Monitor errors
#[derive(Debug, Error)]
pub enum FireguardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Logging initialisation failed: {0}")]
    Logging(String),
}
