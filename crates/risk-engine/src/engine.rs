//! Risk Assessment Engine Implementation

use crate::assessment::{RiskAssessment, RiskLevel};
use crate::fuel::{FuelThresholds, FuelType};
use crate::reading::SensorReading;
use crate::trend::TrendAnalyzer;
use crate::weather::WeatherImpactCalculator;
use crate::RiskError;
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

const GAS_WEIGHT: f64 = 0.4;
const TEMPERATURE_WEIGHT: f64 = 0.3;
const ENVIRONMENT_WEIGHT: f64 = 0.2;
const TREND_WEIGHT: f64 = 0.1;

const FLAME_CONFIDENCE: f64 = 0.95;
const MIN_CONFIDENCE: f64 = 0.5;

/// Factor and action text collected while scoring
#[derive(Debug, Default)]
struct Findings {
    factors: Vec<String>,
    actions: Vec<String>,
}

impl Findings {
    fn factor(&mut self, text: impl Into<String>) {
        self.factors.push(text.into());
    }

    fn action(&mut self, text: impl Into<String>) {
        self.actions.push(text.into());
    }
}

/// Scores readings for one fuel-storage site
///
/// The trend history is the only state carried between calls.
#[derive(Debug, Clone)]
pub struct RiskAssessmentEngine {
    fuel_type: FuelType,
    thresholds: FuelThresholds,
    trend: TrendAnalyzer,
}

impl RiskAssessmentEngine {
    /// Create an engine with thresholds derived from the fuel properties
    pub fn new(fuel_type: FuelType) -> Self {
        let thresholds = FuelThresholds::for_fuel(fuel_type);
        info!("Creating risk engine for {} with thresholds: {:?}", fuel_type, thresholds);
        Self {
            fuel_type,
            thresholds,
            trend: TrendAnalyzer::default(),
        }
    }

    /// Create an engine with site-specific thresholds
    pub fn with_thresholds(
        fuel_type: FuelType,
        thresholds: FuelThresholds,
    ) -> Result<Self, RiskError> {
        thresholds.validate()?;
        info!("Creating risk engine for {} with custom thresholds: {:?}", fuel_type, thresholds);
        Ok(Self {
            fuel_type,
            thresholds,
            trend: TrendAnalyzer::default(),
        })
    }

    /// Replace the trend history with one of the given length
    pub fn with_trend_window(mut self, window: NonZeroUsize) -> Self {
        self.trend = TrendAnalyzer::new(window);
        debug!("Trend history window set to {} readings", self.trend.window());
        self
    }

    pub fn fuel_type(&self) -> FuelType {
        self.fuel_type
    }

    pub fn thresholds(&self) -> &FuelThresholds {
        &self.thresholds
    }

    /// Readings currently held for trend analysis
    pub fn history_len(&self) -> usize {
        self.trend.len()
    }

    /// Current trend factor
    pub fn trend_factor(&self) -> f64 {
        self.trend.trend_factor()
    }

    /// Drop all trend history
    pub fn reset_history(&mut self) {
        debug!("Clearing {} readings of trend history", self.trend.len());
        self.trend.clear();
    }

    /// Assess a reading
    pub fn assess(&mut self, reading: SensorReading) -> RiskAssessment {
        self.trend.add_reading(reading);

        let assessment = if self.flame_present(&reading) {
            warn!(
                "Flame detected (ir={}, uv={}, flag={})",
                reading.flame_ir_raw, reading.flame_uv_raw, reading.flame_detected
            );
            RiskAssessment {
                risk_level: RiskLevel::Critical,
                risk_score: 1.0,
                contributing_factors: vec!["Direct flame detected".to_string()],
                recommended_actions: vec![
                    "IMMEDIATE EVACUATION".to_string(),
                    "Activate fire suppression".to_string(),
                    "Emergency shutdown".to_string(),
                ],
                confidence: FLAME_CONFIDENCE,
                timestamp: reading.timestamp,
            }
        } else {
            self.score(&reading)
        };

        metrics::counter!("risk_assessments_total", "level" => assessment.risk_level.as_str())
            .increment(1);

        assessment
    }

    fn flame_present(&self, reading: &SensorReading) -> bool {
        reading.flame_detected
            || (reading.flame_ir_raw > self.thresholds.flame_ir_threshold
                && reading.flame_uv_raw > self.thresholds.flame_uv_threshold)
    }

    fn score(&self, reading: &SensorReading) -> RiskAssessment {
        let mut findings = Findings::default();

        let gas = self.gas_risk(reading, &mut findings);
        let temperature = self.temperature_risk(reading, &mut findings);
        let environment = Self::environmental_risk(reading, &mut findings);

        let trend_factor = self.trend.trend_factor();
        let trend = (trend_factor - 1.0) * 0.5;
        if trend_factor > 1.2 {
            findings.factor(format!("Increasing trend detected (factor: {:.2})", trend_factor));
            findings.action("Monitor closely - conditions deteriorating");
        }

        let raw_score = gas * GAS_WEIGHT
            + temperature * TEMPERATURE_WEIGHT
            + environment * ENVIRONMENT_WEIGHT
            + trend * TREND_WEIGHT;

        let dispersion = WeatherImpactCalculator::for_reading(reading);
        if dispersion > 1.2 {
            findings.factor("Poor weather conditions for vapor dispersion");
        } else if dispersion < 0.8 {
            findings.factor("Good weather conditions aiding vapor dispersion");
        }

        let scaled = raw_score * dispersion;
        let risk_score = if scaled.is_nan() { 0.0 } else { scaled.clamp(0.0, 1.0) };
        let risk_level = RiskLevel::from_score(risk_score);

        debug!(
            "Risk contributions: gas={:.3} temp={:.3} env={:.3} trend={:.3} dispersion={:.3} -> {:.3} ({})",
            gas, temperature, environment, trend, dispersion, risk_score, risk_level
        );

        RiskAssessment {
            risk_level,
            risk_score,
            contributing_factors: findings.factors,
            recommended_actions: findings.actions,
            confidence: Self::confidence(reading),
            timestamp: reading.timestamp,
        }
    }

    fn gas_risk(&self, reading: &SensorReading, findings: &mut Findings) -> f64 {
        let gas = reading.dominant_gas_ppm();

        if gas > self.thresholds.gas_critical_ppm {
            findings.factor(format!("Critical gas concentration: {:.0} ppm", gas));
            findings.action("Immediate area evacuation");
            findings.action("Ventilation system activation");
            1.0
        } else if gas > self.thresholds.gas_warning_ppm {
            findings.factor(format!("Elevated gas concentration: {:.0} ppm", gas));
            findings.action("Increase monitoring frequency");
            findings.action("Check for leaks");
            gas / self.thresholds.gas_critical_ppm
        } else {
            // Baseline risk below warning
            gas / self.thresholds.gas_warning_ppm * 0.2
        }
    }

    fn temperature_risk(&self, reading: &SensorReading, findings: &mut Findings) -> f64 {
        let temp = reading.temperature_c;
        let warning = self.thresholds.temp_warning_c;
        let critical = self.thresholds.temp_critical_c;

        if temp > critical {
            findings.factor(format!("Critical temperature: {:.1}°C", temp));
            findings.action("Emergency cooling procedures");
            1.0
        } else if temp > warning {
            findings.factor(format!("Elevated temperature: {:.1}°C", temp));
            findings.action("Monitor temperature closely");
            findings.action("Consider cooling measures");
            (temp - warning) / (critical - warning)
        } else {
            0.0
        }
    }

    fn environmental_risk(reading: &SensorReading, findings: &mut Findings) -> f64 {
        let mut risk: f64 = 0.0;

        // Dry air builds static charge
        if reading.humidity_rh < 30.0 {
            findings.factor(format!(
                "Low humidity ({:.1}%) increases static risk",
                reading.humidity_rh
            ));
            findings.action("Increase humidity if possible");
            findings.action("Ground all equipment");
            risk += 0.3;
        }

        if reading.wind_speed_mps < 0.5 {
            findings.factor("Very low wind speed - poor vapor dispersion");
            findings.action("Activate mechanical ventilation");
            risk += 0.4;
        }

        if reading.barometric_pressure_hpa > 1025.0 {
            findings.factor("High pressure system may trap vapors");
            risk += 0.2;
        }

        risk.min(1.0)
    }

    fn confidence(reading: &SensorReading) -> f64 {
        let mut confidence = f64::from(reading.data_quality.min(100)) / 100.0;

        // Sensors near saturation
        if reading.gas_lpg_ppm > 50_000.0 || reading.temperature_c > 100.0 {
            confidence *= 0.8;
        }

        if reading.wind_speed_mps > 20.0 || reading.humidity_rh > 95.0 {
            confidence *= 0.9;
        }

        confidence.max(MIN_CONFIDENCE)
    }
}
