//! Risk Levels and Assessment Results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Safe = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl RiskLevel {
    /// Map a score in [0, 1] to a level
    pub fn from_score(score: f64) -> Self {
        if score < 0.2 {
            RiskLevel::Safe
        } else if score < 0.4 {
            RiskLevel::Low
        } else if score < 0.6 {
            RiskLevel::Medium
        } else if score < 0.8 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// Integer wire value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Upper-case name used in alert text
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// Whether dispatches at this level enter the escalation machine
    pub fn is_escalatable(self) -> bool {
        self >= RiskLevel::High
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of assessing one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// Score in [0, 1]
    pub risk_score: f64,
    pub contributing_factors: Vec<String>,
    pub recommended_actions: Vec<String>,
    /// Confidence in [0.5, 1]
    pub confidence: f64,
    /// Timestamp of the assessed reading (epoch seconds)
    pub timestamp: f64,
}
