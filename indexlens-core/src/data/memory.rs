//! In-memory price provider for tests and offline runs.

use std::collections::HashMap;

use super::provider::{DataError, PriceProvider};
use crate::domain::{PriceBar, PriceSeries};
use crate::window::DateWindow;

#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    bars: HashMap<String, Vec<PriceBar>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(symbol.into(), bars);
        self
    }

    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<PriceBar>) {
        self.bars.insert(symbol.into(), bars);
    }
}

impl PriceProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn fetch(&self, symbol: &str, window: DateWindow) -> Result<PriceSeries, DataError> {
        let bars = self
            .bars
            .get(symbol)
            .ok_or_else(|| DataError::unavailable(symbol, "symbol not found"))?;

        let in_window: Vec<PriceBar> = bars
            .iter()
            .filter(|b| window.contains(b.date))
            .cloned()
            .collect();

        if in_window.is_empty() {
            return Err(DataError::unavailable(symbol, "no rows in window"));
        }

        Ok(PriceSeries::new(symbol, in_window))
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            adj_close: Some(1.0),
            volume: 1,
        }
    }

    fn window(from: u32, to: u32) -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2024, 1, from).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, to).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn restricts_to_window() {
        let provider = InMemoryProvider::new().with_symbol("SPY", vec![bar(2), bar(3), bar(10)]);
        let series = provider.fetch("SPY", window(1, 5)).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn unknown_symbol_and_empty_window_are_unavailable() {
        let provider = InMemoryProvider::new().with_symbol("SPY", vec![bar(2)]);
        assert!(matches!(
            provider.fetch("NOPE", window(1, 5)),
            Err(DataError::DataUnavailable { .. })
        ));
        assert!(matches!(
            provider.fetch("SPY", window(20, 25)),
            Err(DataError::DataUnavailable { .. })
        ));
    }
}
