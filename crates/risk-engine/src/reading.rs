//! Sensor Reading

use serde::{Deserialize, Serialize};

/// One sample from a tank-side sensor node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Sample time (epoch seconds)
    pub timestamp: f64,
    /// Primary gas channel (ppm)
    pub gas_lpg_ppm: f64,
    /// Secondary gas channel (ppm)
    pub gas_smoke_ppm: f64,
    pub temperature_c: f64,
    pub humidity_rh: f64,
    /// Flame sensor IR raw ADC value
    pub flame_ir_raw: u16,
    /// Flame sensor UV raw ADC value
    pub flame_uv_raw: u16,
    pub flame_detected: bool,
    pub wind_speed_mps: f64,
    pub wind_direction_deg: u16,
    pub barometric_pressure_hpa: f64,
    /// Data quality (0-100%)
    pub data_quality: u8,
}

impl SensorReading {
    /// Highest of the two gas channels
    pub fn dominant_gas_ppm(&self) -> f64 {
        self.gas_lpg_ppm.max(self.gas_smoke_ppm)
    }
}

impl Default for SensorReading {
    /// Calm, clean baseline reading
    fn default() -> Self {
        Self {
            timestamp: 0.0,
            gas_lpg_ppm: 0.0,
            gas_smoke_ppm: 0.0,
            temperature_c: 20.0,
            humidity_rh: 50.0,
            flame_ir_raw: 0,
            flame_uv_raw: 0,
            flame_detected: false,
            wind_speed_mps: 3.0,
            wind_direction_deg: 0,
            barometric_pressure_hpa: 1013.0,
            data_quality: 100,
        }
    }
}
