//! Weather Impact on Vapor Dispersion

use crate::reading::SensorReading;

/// Individual dispersion multipliers
///
/// Values above 1.0 mean vapors linger, below 1.0 mean they dilute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionFactors {
    pub wind: f64,
    pub inversion: f64,
    pub humidity: f64,
}

impl DispersionFactors {
    /// Product of all factors
    pub fn combined(&self) -> f64 {
        self.wind * self.inversion * self.humidity
    }
}

/// Stateless weather model
pub struct WeatherImpactCalculator;

impl WeatherImpactCalculator {
    /// Break down the dispersion multiplier for the given conditions
    ///
    /// `_wind_direction_deg` is accepted for directional plume modeling but
    /// does not affect the current model.
    pub fn factors(
        wind_speed_mps: f64,
        _wind_direction_deg: u16,
        temperature_c: f64,
        humidity_rh: f64,
        pressure_hpa: f64,
    ) -> DispersionFactors {
        let wind = if wind_speed_mps < 0.5 {
            1.5
        } else if wind_speed_mps < 2.0 {
            1.2
        } else if wind_speed_mps < 5.0 {
            0.8
        } else {
            0.6
        };

        // High pressure with calm, cold air traps vapor near the ground
        let inversion = if pressure_hpa > 1020.0 && wind_speed_mps < 1.0 && temperature_c < 10.0 {
            1.4
        } else {
            1.0
        };

        let humidity = if humidity_rh > 50.0 {
            1.0 - (humidity_rh - 50.0) * 0.002
        } else {
            1.0
        };

        DispersionFactors {
            wind,
            inversion,
            humidity,
        }
    }

    /// Combined dispersion multiplier
    pub fn dispersion_factor(
        wind_speed_mps: f64,
        wind_direction_deg: u16,
        temperature_c: f64,
        humidity_rh: f64,
        pressure_hpa: f64,
    ) -> f64 {
        Self::factors(
            wind_speed_mps,
            wind_direction_deg,
            temperature_c,
            humidity_rh,
            pressure_hpa,
        )
        .combined()
    }

    /// Dispersion multiplier for the conditions in a reading
    pub fn for_reading(reading: &SensorReading) -> f64 {
        Self::dispersion_factor(
            reading.wind_speed_mps,
            reading.wind_direction_deg,
            reading.temperature_c,
            reading.humidity_rh,
            reading.barometric_pressure_hpa,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_bands() {
        let wind = |speed| WeatherImpactCalculator::factors(speed, 0, 20.0, 40.0, 1013.0).wind;
        assert_eq!(wind(0.2), 1.5);
        assert_eq!(wind(0.5), 1.2);
        assert_eq!(wind(1.9), 1.2);
        assert_eq!(wind(2.0), 0.8);
        assert_eq!(wind(5.0), 0.6);
        assert_eq!(wind(25.0), 0.6);
    }

    #[test]
    fn test_inversion_requires_all_conditions() {
        let f = WeatherImpactCalculator::factors(0.2, 0, 5.0, 40.0, 1030.0);
        assert_eq!(f.inversion, 1.4);

        assert_eq!(WeatherImpactCalculator::factors(1.0, 0, 5.0, 40.0, 1030.0).inversion, 1.0);
        assert_eq!(WeatherImpactCalculator::factors(0.2, 0, 10.0, 40.0, 1030.0).inversion, 1.0);
        assert_eq!(WeatherImpactCalculator::factors(0.2, 0, 5.0, 40.0, 1020.0).inversion, 1.0);
    }

    #[test]
    fn test_calm_cold_high_pressure_amplifies() {
        let factor = WeatherImpactCalculator::dispersion_factor(0.2, 90, 5.0, 70.0, 1030.0);
        let humidity = 1.0 - 20.0 * 0.002;
        assert!((factor - 1.5 * 1.4 * humidity).abs() < 1e-9);
        assert!(factor > 1.0);
    }

    #[test]
    fn test_humidity_suppression() {
        assert_eq!(WeatherImpactCalculator::factors(3.0, 0, 20.0, 50.0, 1013.0).humidity, 1.0);
        let f = WeatherImpactCalculator::factors(3.0, 0, 20.0, 100.0, 1013.0);
        assert!((f.humidity - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_wind_direction_is_ignored() {
        let a = WeatherImpactCalculator::dispersion_factor(1.0, 0, 15.0, 60.0, 1010.0);
        let b = WeatherImpactCalculator::dispersion_factor(1.0, 270, 15.0, 60.0, 1010.0);
        assert_eq!(a, b);
    }
}
