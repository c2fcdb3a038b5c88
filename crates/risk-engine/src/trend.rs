//! Rolling Trend Analysis

use crate::reading::SensorReading;
use crate::stats::{linear_slope, mean};
use ring_buffer::RingBuffer;
use std::num::NonZeroUsize;

/// Default history length (readings)
pub const DEFAULT_TREND_WINDOW: NonZeroUsize = match NonZeroUsize::new(30) {
    Some(n) => n,
    None => unreachable!(),
};

/// Readings compared per window
const TREND_WINDOW: usize = 5;

const MIN_TREND_FACTOR: f64 = 0.5;
const MAX_TREND_FACTOR: f64 = 3.0;

/// Derives a trend factor from recent gas and temperature history
///
/// 1.0 is stable, above 1.0 is deteriorating.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    history: RingBuffer<SensorReading>,
}

impl TrendAnalyzer {
    /// Create an analyzer holding at most `window` readings
    pub fn new(window: NonZeroUsize) -> Self {
        Self {
            history: RingBuffer::new(window),
        }
    }

    /// Record a reading, evicting the oldest when full
    pub fn add_reading(&mut self, reading: SensorReading) {
        self.history.push(reading);
    }

    /// Number of readings held
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Maximum readings held
    pub fn window(&self) -> usize {
        self.history.capacity()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Current trend factor in [0.5, 3.0]
    pub fn trend_factor(&self) -> f64 {
        let len = self.history.len();
        if len < TREND_WINDOW {
            return 1.0;
        }

        let recent_gas: Vec<f64> = self
            .history
            .last_n(TREND_WINDOW)
            .map(|r| r.gas_lpg_ppm)
            .collect();

        let older_mean = if len >= TREND_WINDOW * 2 {
            let older: Vec<f64> = self
                .history
                .range(len - TREND_WINDOW * 2..len - TREND_WINDOW)
                .map(|r| r.gas_lpg_ppm)
                .collect();
            mean(&older)
        } else {
            mean(&recent_gas)
        };

        if older_mean == 0.0 {
            return 1.0;
        }

        let last_gas = recent_gas.last().copied().unwrap_or(older_mean);
        let trend_ratio = last_gas / older_mean;

        let recent_temps: Vec<f64> = self
            .history
            .last_n(TREND_WINDOW)
            .map(|r| r.temperature_c)
            .collect();
        let temp_slope = linear_slope(&recent_temps);

        let factor = trend_ratio + temp_slope * 0.1;
        if factor.is_nan() {
            return 1.0;
        }
        factor.clamp(MIN_TREND_FACTOR, MAX_TREND_FACTOR)
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reading(gas: f64, temp: f64) -> SensorReading {
        SensorReading {
            gas_lpg_ppm: gas,
            temperature_c: temp,
            ..Default::default()
        }
    }

    #[test]
    fn test_neutral_below_five_readings() {
        let mut analyzer = TrendAnalyzer::default();
        for gas in [10.0, 500.0, 5000.0, 90000.0] {
            analyzer.add_reading(reading(gas, 25.0));
            assert_eq!(analyzer.trend_factor(), 1.0);
        }
    }

    #[test]
    fn test_stable_history_is_neutral() {
        let mut analyzer = TrendAnalyzer::default();
        for _ in 0..12 {
            analyzer.add_reading(reading(100.0, 25.0));
        }
        assert!((analyzer.trend_factor() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rising_gas_increases_factor() {
        let mut analyzer = TrendAnalyzer::default();
        for _ in 0..5 {
            analyzer.add_reading(reading(100.0, 25.0));
        }
        for gas in [120.0, 140.0, 160.0, 180.0, 200.0] {
            analyzer.add_reading(reading(gas, 25.0));
        }
        // last / older mean = 200 / 100
        assert!((analyzer.trend_factor() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_self_comparison_with_fewer_than_ten() {
        let mut analyzer = TrendAnalyzer::default();
        for gas in [100.0, 100.0, 100.0, 100.0, 150.0] {
            analyzer.add_reading(reading(gas, 25.0));
        }
        // 150 / mean(100, 100, 100, 100, 150)
        assert!((analyzer.trend_factor() - 150.0 / 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_temperature_slope_contributes() {
        let mut analyzer = TrendAnalyzer::default();
        for temp in [20.0, 22.0, 24.0, 26.0, 28.0] {
            analyzer.add_reading(reading(100.0, temp));
        }
        assert!((analyzer.trend_factor() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_zero_gas_history_is_neutral() {
        let mut analyzer = TrendAnalyzer::default();
        for _ in 0..10 {
            analyzer.add_reading(reading(0.0, 80.0));
        }
        assert_eq!(analyzer.trend_factor(), 1.0);
    }

    #[test]
    fn test_factor_is_clamped() {
        let mut analyzer = TrendAnalyzer::default();
        for _ in 0..5 {
            analyzer.add_reading(reading(10.0, 25.0));
        }
        for _ in 0..5 {
            analyzer.add_reading(reading(10_000.0, 25.0));
        }
        assert_eq!(analyzer.trend_factor(), 3.0);

        for _ in 0..5 {
            analyzer.add_reading(reading(1.0, 25.0));
        }
        assert_eq!(analyzer.trend_factor(), 0.5);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut analyzer = TrendAnalyzer::new(NonZeroUsize::new(6).unwrap());
        for i in 0..20 {
            analyzer.add_reading(reading(i as f64, 25.0));
        }
        assert_eq!(analyzer.len(), 6);
        assert_eq!(analyzer.window(), 6);
    }

    proptest! {
        #[test]
        fn trend_factor_stays_in_bounds(
            samples in proptest::collection::vec((0.0f64..100_000.0, -40.0f64..300.0), 0..60)
        ) {
            let mut analyzer = TrendAnalyzer::default();
            for (gas, temp) in samples {
                analyzer.add_reading(reading(gas, temp));
                let factor = analyzer.trend_factor();
                prop_assert!((0.5..=3.0).contains(&factor));
                if analyzer.len() < 5 {
                    prop_assert_eq!(factor, 1.0);
                }
            }
        }
    }
}
