//! Small Statistics Helpers

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Least-squares slope of `values` against their index
///
/// Returns 0.0 for fewer than two values or when the slope is undefined.
pub fn linear_slope(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }

    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);

    let mut covariance = 0.0;
    let mut x_variance = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        covariance += dx * (y - y_mean);
        x_variance += dx * dx;
    }

    let slope = covariance / x_variance;
    if slope.is_finite() {
        slope
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        assert!((mean(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 3.0).abs() < 0.001);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_slope_of_line() {
        let values = [10.0, 12.0, 14.0, 16.0, 18.0];
        assert!((linear_slope(&values) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_slope_of_flat_and_short_series() {
        assert_eq!(linear_slope(&[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(linear_slope(&[5.0]), 0.0);
        assert_eq!(linear_slope(&[]), 0.0);
    }

    #[test]
    fn test_slope_of_noisy_series() {
        // polyfit([0..5], [20, 22, 21, 25, 24], 1) slope = 1.1
        let values = [20.0, 22.0, 21.0, 25.0, 24.0];
        assert!((linear_slope(&values) - 1.1).abs() < 1e-9);
    }
}
