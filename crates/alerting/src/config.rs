//! Alert Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Escalation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Wait before escalating an unacknowledged HIGH/CRITICAL alert (minutes)
    pub escalation_delay_minutes: u64,
    /// Reserved: sends are never retried automatically
    pub max_retries: u32,
    /// Reserved: carried for configuration compatibility, not consulted
    pub require_acknowledgment: bool,
    /// Schedule escalation checks for HIGH/CRITICAL dispatches
    pub auto_escalate: bool,
    /// Upper bound on a single channel send (seconds)
    pub send_timeout_secs: u64,
    /// Keep settled tracking entries this long after dispatch (minutes)
    pub tracking_retention_minutes: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            escalation_delay_minutes: 5,
            max_retries: 3,
            require_acknowledgment: true,
            auto_escalate: true,
            send_timeout_secs: 10,
            tracking_retention_minutes: 60,
        }
    }
}

impl AlertConfig {
    pub fn escalation_delay(&self) -> Duration {
        Duration::from_secs(self.escalation_delay_minutes.saturating_mul(60))
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub fn tracking_retention(&self) -> Duration {
        Duration::from_secs(self.tracking_retention_minutes.saturating_mul(60))
    }
}
