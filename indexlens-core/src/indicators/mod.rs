//! Rolling indicators over price series.
//!
//! `sma` holds the rolling-mean primitive; `moving_average` turns it into
//! named derived columns on a [`PriceSeries`](crate::domain::PriceSeries).

pub mod moving_average;
pub mod sma;

pub use moving_average::{
    augment, ma_column_name, AugmentError, MovingAverageAugmenter, DEFAULT_MA_WINDOWS,
};
pub use sma::rolling_mean;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
