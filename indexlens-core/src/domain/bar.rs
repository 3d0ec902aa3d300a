//! Daily price bars and the per-symbol price series built from them.

use chrono::NaiveDate;

/// OHLCV bar for a single symbol on a single trading day.
///
/// `adj_close` is optional: providers occasionally omit the adjusted close for
/// a day while still reporting the raw quote. Moving averages treat a missing
/// value as a gap rather than a zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: u64,
}

/// A date-ordered series of bars for one symbol, plus derived columns.
///
/// Derived columns keep insertion order and hold exactly one entry per bar.
/// Setting a column that already exists replaces it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl PriceSeries {
    /// Build a series, sorting bars by date. Duplicate dates keep the first bar.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
            columns: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Adjusted closes with NaN normalized to `None`.
    pub fn adj_closes(&self) -> Vec<Option<f64>> {
        self.bars
            .iter()
            .map(|b| b.adj_close.filter(|v| !v.is_nan()))
            .collect()
    }

    /// Insert or replace a derived column.
    ///
    /// # Panics
    /// Panics if `values` does not have one entry per bar.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        assert_eq!(
            values.len(),
            self.bars.len(),
            "derived column length must match bar count"
        );
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
pub(crate) fn make_series(adj_closes: &[f64]) -> PriceSeries {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = adj_closes
        .iter()
        .enumerate()
        .map(|(i, &adj)| PriceBar {
            date: base_date + chrono::Duration::days(i as i64),
            open: adj,
            high: adj + 1.0,
            low: adj - 1.0,
            close: adj,
            adj_close: Some(adj),
            volume: 1000,
        })
        .collect();
    PriceSeries::new("TEST", bars)
}
