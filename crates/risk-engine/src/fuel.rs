//! Fuel Combustion Properties and Derived Thresholds

use crate::RiskError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flame sensor IR ADC threshold
const FLAME_IR_THRESHOLD: u16 = 512;
/// Flame sensor UV ADC threshold
const FLAME_UV_THRESHOLD: u16 = 256;

/// Largest accepted critical/warning gas ratio
const MAX_GAS_CRITICAL_RATIO: f64 = 5.0;

/// Stored fuel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Petrol,
    Diesel,
    Ethanol,
    JetA1,
}

/// Combustion constants for a fuel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelProperties {
    /// Lowest temperature at which vapor can ignite (°C)
    pub flash_point_c: f64,
    /// Ignition temperature without an external spark (°C)
    pub autoignition_c: f64,
    /// Vapor density relative to air
    pub vapor_density: f64,
    /// Lower explosive limit (ppm)
    pub lel_ppm: f64,
    /// Upper explosive limit (ppm)
    pub uel_ppm: f64,
    /// Above this, vapor pressure increases rapidly (°C)
    pub critical_temp_c: f64,
}

const PETROL: FuelProperties = FuelProperties {
    flash_point_c: -43.0,
    autoignition_c: 280.0,
    vapor_density: 3.4,
    lel_ppm: 14_000.0,
    uel_ppm: 76_000.0,
    critical_temp_c: 45.0,
};

const ETHANOL: FuelProperties = FuelProperties {
    flash_point_c: 13.0,
    autoignition_c: 365.0,
    vapor_density: 1.59,
    lel_ppm: 33_000.0,
    uel_ppm: 190_000.0,
    critical_temp_c: 40.0,
};

const DIESEL: FuelProperties = FuelProperties {
    flash_point_c: 52.0,
    autoignition_c: 210.0,
    vapor_density: 4.5,
    lel_ppm: 6_000.0,
    uel_ppm: 75_000.0,
    critical_temp_c: 70.0,
};

const JET_A1: FuelProperties = FuelProperties {
    flash_point_c: 38.0,
    autoignition_c: 210.0,
    vapor_density: 4.5,
    lel_ppm: 6_000.0,
    uel_ppm: 75_000.0,
    critical_temp_c: 60.0,
};

impl FuelType {
    /// All supported fuels
    pub const ALL: [FuelType; 4] = [
        FuelType::Petrol,
        FuelType::Diesel,
        FuelType::Ethanol,
        FuelType::JetA1,
    ];

    /// Combustion constants for this fuel
    pub fn properties(self) -> &'static FuelProperties {
        match self {
            FuelType::Petrol => &PETROL,
            FuelType::Diesel => &DIESEL,
            FuelType::Ethanol => &ETHANOL,
            FuelType::JetA1 => &JET_A1,
        }
    }

    /// Configuration name of this fuel
    pub fn as_str(self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Ethanol => "ethanol",
            FuelType::JetA1 => "jet_a1",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        FuelType::ALL
            .into_iter()
            .find(|fuel| fuel.as_str() == name)
            .ok_or_else(|| RiskError::UnknownFuel(s.to_string()))
    }
}

/// Alarm thresholds derived from fuel properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelThresholds {
    /// 10% of LEL
    pub gas_warning_ppm: f64,
    /// 25% of LEL
    pub gas_critical_ppm: f64,
    /// Fuel critical temperature (°C)
    pub temp_warning_c: f64,
    /// 70% of autoignition temperature (°C)
    pub temp_critical_c: f64,
    /// Flame IR ADC threshold
    pub flame_ir_threshold: u16,
    /// Flame UV ADC threshold
    pub flame_uv_threshold: u16,
}

impl FuelThresholds {
    /// Derive thresholds for a fuel
    pub fn for_fuel(fuel: FuelType) -> Self {
        let props = fuel.properties();
        Self {
            gas_warning_ppm: props.lel_ppm * 0.1,
            gas_critical_ppm: props.lel_ppm * 0.25,
            temp_warning_c: props.critical_temp_c,
            temp_critical_c: props.autoignition_c * 0.7,
            flame_ir_threshold: FLAME_IR_THRESHOLD,
            flame_uv_threshold: FLAME_UV_THRESHOLD,
        }
    }

    /// Check warning < critical ordering for gas and temperature
    ///
    /// Gas risk is 0.2 at the warning level and `warning / critical` just
    /// above it, so critical may be at most five times warning.
    pub fn validate(&self) -> Result<(), RiskError> {
        if !(self.gas_warning_ppm > 0.0 && self.gas_warning_ppm < self.gas_critical_ppm) {
            return Err(RiskError::InvalidThresholds(format!(
                "gas warning {} ppm must be positive and below critical {} ppm",
                self.gas_warning_ppm, self.gas_critical_ppm
            )));
        }
        if self.gas_critical_ppm > self.gas_warning_ppm * MAX_GAS_CRITICAL_RATIO {
            return Err(RiskError::InvalidThresholds(format!(
                "gas critical {} ppm exceeds {}x warning {} ppm",
                self.gas_critical_ppm, MAX_GAS_CRITICAL_RATIO, self.gas_warning_ppm
            )));
        }
        if !(self.temp_warning_c < self.temp_critical_c) {
            return Err(RiskError::InvalidThresholds(format!(
                "temperature warning {}°C must be below critical {}°C",
                self.temp_warning_c, self.temp_critical_c
            )));
        }
        Ok(())
    }
}
