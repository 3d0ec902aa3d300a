//! Moving-average augmentation of price series.
//!
//! Appends one derived column per window, named `"MA for {w} days"`, holding
//! the trailing mean of adjusted close. Re-augmenting with the same windows
//! overwrites the columns instead of duplicating them.

use thiserror::Error;

use super::sma::rolling_mean;
use crate::domain::PriceSeries;

/// Windows used by the dashboard, applied in this order.
pub const DEFAULT_MA_WINDOWS: [usize; 3] = [10, 20, 50];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AugmentError {
    #[error("moving-average window must be at least 1 day")]
    ZeroWindow,
}

/// Column name for a moving-average window.
pub fn ma_column_name(window: usize) -> String {
    format!("MA for {window} days")
}

/// Adds moving-average columns over adjusted close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovingAverageAugmenter {
    windows: Vec<usize>,
}

impl MovingAverageAugmenter {
    pub fn new(windows: &[usize]) -> Result<Self, AugmentError> {
        if windows.contains(&0) {
            return Err(AugmentError::ZeroWindow);
        }
        Ok(Self {
            windows: windows.to_vec(),
        })
    }

    pub fn augment(&self, series: &mut PriceSeries) {
        let adj = series.adj_closes();
        for &window in &self.windows {
            // Zero windows are rejected in `new`.
            if let Ok(values) = rolling_mean(&adj, window) {
                series.set_column(ma_column_name(window), values);
            }
        }
    }
}

impl Default for MovingAverageAugmenter {
    fn default() -> Self {
        Self {
            windows: DEFAULT_MA_WINDOWS.to_vec(),
        }
    }
}

/// Augment `series` in place with one column per window.
pub fn augment(series: &mut PriceSeries, windows: &[usize]) -> Result<(), AugmentError> {
    MovingAverageAugmenter::new(windows)?.augment(series);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::make_series;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn flat_series_window_10() {
        let mut series = make_series(&[100.0; 60]);
        augment(&mut series, &[10]).unwrap();

        let ma = series.column("MA for 10 days").unwrap();
        assert_eq!(ma.len(), 60);
        assert!(ma[..9].iter().all(Option::is_none));
        for v in &ma[9..] {
            assert_eq!(*v, Some(100.0));
        }
    }

    #[test]
    fn default_windows_in_order() {
        let mut series = make_series(&[1.0; 5]);
        MovingAverageAugmenter::default().augment(&mut series);
        assert_eq!(
            series.column_names(),
            vec!["MA for 10 days", "MA for 20 days", "MA for 50 days"]
        );
        // Series shorter than every window: nothing is defined
        for (_, values) in series.columns() {
            assert!(values.iter().all(Option::is_none));
        }
    }

    #[test]
    fn augment_is_idempotent() {
        let closes: Vec<f64> = (0..80).map(|i| 50.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let mut once = make_series(&closes);
        augment(&mut once, &DEFAULT_MA_WINDOWS).unwrap();

        let mut twice = once.clone();
        augment(&mut twice, &DEFAULT_MA_WINDOWS).unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.column_names().len(), 3);
    }

    #[test]
    fn uses_adj_close_not_close() {
        let mut series = make_series(&[10.0, 20.0]);
        let mut bars = series.bars().to_vec();
        bars[0].close = 999.0;
        bars[1].close = 999.0;
        series = PriceSeries::new("TEST", bars);

        augment(&mut series, &[2]).unwrap();
        assert_approx(series.column("MA for 2 days").unwrap()[1].unwrap(), 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn missing_adj_close_leaves_dependent_rows_undefined() {
        let mut bars = make_series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).bars().to_vec();
        bars[1].adj_close = None;
        let mut series = PriceSeries::new("TEST", bars);

        augment(&mut series, &[3]).unwrap();
        let ma = series.column("MA for 3 days").unwrap();
        assert_eq!(&ma[..4], &[None, None, None, None]);
        assert_approx(ma[4].unwrap(), 4.0, DEFAULT_EPSILON);
        assert_approx(ma[5].unwrap(), 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_window_rejected() {
        let mut series = make_series(&[1.0, 2.0]);
        assert_eq!(augment(&mut series, &[10, 0]), Err(AugmentError::ZeroWindow));
        assert!(series.column_names().is_empty());
    }

    #[test]
    fn caller_windows_untouched() {
        let windows = vec![20, 10];
        let mut series = make_series(&[1.0; 30]);
        augment(&mut series, &windows).unwrap();
        assert_eq!(windows, vec![20, 10]);
        assert_eq!(series.column_names(), vec!["MA for 20 days", "MA for 10 days"]);
    }
}
