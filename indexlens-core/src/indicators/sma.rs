//! Simple Moving Average (SMA).
//!
//! Rolling mean over a trailing window of `period` values.
//! Lookback: period - 1 (first valid value at index period-1).
//! A missing value anywhere in the window makes that position missing.

use super::moving_average::AugmentError;

#[derive(Debug, Clone)]
pub(crate) struct Sma {
    period: usize,
}

impl Sma {
    pub(crate) fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self { period }
    }

    pub(crate) fn compute(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let n = values.len();
        let mut result = vec![None; n];

        if n < self.period {
            return result;
        }

        // Sum of present values in the window and how many are missing
        let mut sum = 0.0;
        let mut missing = 0usize;

        for (i, value) in values.iter().enumerate() {
            match value {
                Some(v) => sum += *v,
                None => missing += 1,
            }

            if i >= self.period {
                match values[i - self.period] {
                    Some(v) => sum -= v,
                    None => missing -= 1,
                }
            }

            if i + 1 >= self.period && missing == 0 {
                result[i] = Some(sum / self.period as f64);
            }

            // Rebuild the sum once the window is clean again so drift from
            // earlier subtractions does not accumulate.
            if missing == 0 && i + 1 >= self.period && i % self.period == 0 {
                sum = values[(i + 1 - self.period)..=i].iter().flatten().sum();
            }
        }

        result
    }
}

/// Trailing rolling mean over `window` values; see [`Sma`].
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>, AugmentError> {
    if window == 0 {
        return Err(AugmentError::ZeroWindow);
    }
    Ok(Sma::new(window).compute(values))
}
