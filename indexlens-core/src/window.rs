//! Date windows for price downloads.
//!
//! The analysis window is a one-year lookback anchored on "today": the end is
//! today and the start is the same month/day one year earlier. Feb 29 has no
//! counterpart in a non-leap year, so it clamps to Feb 28.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("cannot compute window from {date}: {reason}")]
    InvalidDate { date: NaiveDate, reason: &'static str },

    #[error("window start {start} is not before end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Inclusive date range `[start, end]` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if start >= end {
            return Err(WindowError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// One calendar year back from `today`, month/day preserved.
    pub fn one_year_back(today: NaiveDate) -> Result<Self, WindowError> {
        let year = today.year() - 1;
        let start = NaiveDate::from_ymd_opt(year, today.month(), today.day())
            .or_else(|| {
                if today.month() == 2 && today.day() == 29 {
                    NaiveDate::from_ymd_opt(year, 2, 28)
                } else {
                    None
                }
            })
            .ok_or(WindowError::InvalidDate {
                date: today,
                reason: "previous year is out of range",
            })?;
        Self::new(start, today)
    }

    /// January 1st of the current year through `today`.
    pub fn year_to_date(today: NaiveDate) -> Result<Self, WindowError> {
        let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).ok_or(WindowError::InvalidDate {
            date: today,
            reason: "year is out of range",
        })?;
        if start == today {
            return Err(WindowError::InvalidDate {
                date: today,
                reason: "year-to-date window is empty on January 1st",
            });
        }
        Self::new(start, today)
    }

    /// Today's date in the local timezone.
    pub fn today_local() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn one_year_back_preserves_month_and_day() {
        let w = DateWindow::one_year_back(date(2024, 6, 14)).unwrap();
        assert_eq!(w.start(), date(2023, 6, 14));
        assert_eq!(w.end(), date(2024, 6, 14));
    }

    #[test]
    fn leap_day_clamps_to_feb_28() {
        let w = DateWindow::one_year_back(date(2024, 2, 29)).unwrap();
        assert_eq!(w.start(), date(2023, 2, 28));
        assert_eq!(w.end(), date(2024, 2, 29));
    }

    #[test]
    fn leap_year_start_is_kept_when_valid() {
        // 2025-02-28 -> 2024-02-28, not the leap day
        let w = DateWindow::one_year_back(date(2025, 2, 28)).unwrap();
        assert_eq!(w.start(), date(2024, 2, 28));
    }

    #[test]
    fn unrepresentable_year_fails() {
        let err = DateWindow::one_year_back(NaiveDate::MIN).unwrap_err();
        assert!(matches!(err, WindowError::InvalidDate { .. }));
    }

    #[test]
    fn year_to_date_starts_january_first() {
        let w = DateWindow::year_to_date(date(2024, 3, 5)).unwrap();
        assert_eq!(w.start(), date(2024, 1, 1));
        assert_eq!(w.end(), date(2024, 3, 5));
    }

    #[test]
    fn year_to_date_on_new_year_is_rejected() {
        assert!(DateWindow::year_to_date(date(2024, 1, 1)).is_err());
    }

    #[test]
    fn new_rejects_inverted_range() {
        let err = DateWindow::new(date(2024, 2, 1), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, WindowError::InvalidRange { .. }));
    }

    #[test]
    fn contains_is_inclusive() {
        let w = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(w.contains(date(2024, 1, 1)));
        assert!(w.contains(date(2024, 1, 31)));
        assert!(!w.contains(date(2024, 2, 1)));
    }
}
