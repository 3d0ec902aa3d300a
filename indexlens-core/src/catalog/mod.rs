//! Constituent catalog — the index membership table and its filters.
//!
//! The catalog is loaded once from a [`CatalogSource`] and then only read.
//! Filters return sub-catalogs sharing the same header list, so they can be
//! chained (sector first, then company) the way the dashboard narrows a view.

pub mod html;
pub mod source;
pub mod wikipedia;

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use thiserror::Error;

use crate::domain::{ConstituentRow, SYMBOL};

pub use html::parse_first_table;
pub use source::{CatalogSource, CsvFileSource, HtmlSource, RawTable, StaticSource};
pub use wikipedia::WikipediaSource;

/// Errors from loading or building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog source unavailable ({origin}): {reason}")]
    SourceUnavailable { origin: String, reason: String },

    #[error("catalog table has no '{0}' column")]
    MissingColumn(String),

    #[error("duplicate symbol in catalog: {0}")]
    DuplicateSymbol(String),

    #[error("row {row} has {found} cells but the table has {expected} columns")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Ordered constituent rows with a shared header list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstituentCatalog {
    headers: Arc<[String]>,
    rows: Vec<ConstituentRow>,
}

impl ConstituentCatalog {
    /// Build a catalog from a header row and records, validating symbol uniqueness.
    ///
    /// Short records are padded with empty cells; records wider than the header
    /// are rejected rather than truncated.
    pub fn from_table(headers: Vec<String>, records: Vec<Vec<String>>) -> Result<Self, CatalogError> {
        if !headers.iter().any(|h| h == SYMBOL) {
            return Err(CatalogError::MissingColumn(SYMBOL.to_string()));
        }

        let headers: Arc<[String]> = headers.into();
        let mut seen = HashSet::with_capacity(records.len());
        let mut rows = Vec::with_capacity(records.len());

        for (i, record) in records.into_iter().enumerate() {
            if record.len() > headers.len() {
                return Err(CatalogError::RaggedRow {
                    row: i + 1,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            let row = ConstituentRow::new(Arc::clone(&headers), record);
            if !seen.insert(row.symbol().to_string()) {
                return Err(CatalogError::DuplicateSymbol(row.symbol().to_string()));
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Load the catalog from a source. Rows are kept verbatim and in source order.
    pub fn load(source: &dyn CatalogSource) -> Result<Self, CatalogError> {
        let table = source.load_table()?;
        let catalog = Self::from_table(table.headers, table.records)?;
        tracing::info!(
            source = %source.describe(),
            rows = catalog.len(),
            columns = catalog.headers.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[ConstituentRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (rows, columns) of the table.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    /// Rows whose GICS Sector is one of `sectors`, in original order.
    pub fn filter_by_sector<I, S>(&self, sectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: HashSet<String> = sectors.into_iter().map(|s| s.as_ref().to_string()).collect();
        self.retain(|row| wanted.contains(row.gics_sector()))
    }

    /// Rows whose Security is one of `companies`, in original order.
    pub fn filter_by_company<I, S>(&self, companies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: HashSet<String> = companies
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        self.retain(|row| wanted.contains(row.security()))
    }

    /// Distinct sectors, sorted.
    pub fn list_sectors(&self) -> BTreeSet<String> {
        self.rows.iter().map(|r| r.gics_sector().to_string()).collect()
    }

    /// Company names, sorted (not deduplicated).
    pub fn list_companies(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rows.iter().map(|r| r.security().to_string()).collect();
        names.sort();
        names
    }

    /// Symbols in catalog order.
    pub fn symbols(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.symbol().to_string()).collect()
    }

    pub fn find(&self, symbol: &str) -> Option<&ConstituentRow> {
        self.rows.iter().find(|r| r.symbol() == symbol)
    }

    pub fn security_for(&self, symbol: &str) -> Option<&str> {
        self.find(symbol).map(ConstituentRow::security)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self {
            headers: Arc::clone(&self.headers),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    fn retain(&self, keep: impl Fn(&ConstituentRow) -> bool) -> Self {
        Self {
            headers: Arc::clone(&self.headers),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_catalog() -> ConstituentCatalog {
    let headers = ["Symbol", "Security", "GICS Sector", "GICS Sub-Industry"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let records = [
        ["AAPL", "Apple Inc.", "Tech", "Hardware"],
        ["JPM", "JPMorgan Chase", "Financials", "Banks"],
        ["XOM", "ExxonMobil", "Energy", "Integrated Oil & Gas"],
    ]
    .iter()
    .map(|r| r.iter().map(|s| s.to_string()).collect())
    .collect();
    ConstituentCatalog::from_table(headers, records).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_by_single_sector() {
        let catalog = sample_catalog();
        let tech = catalog.filter_by_sector(["Tech"]);
        assert_eq!(tech.symbols(), vec!["AAPL"]);
    }

    #[test]
    fn empty_sector_set_yields_nothing() {
        let catalog = sample_catalog();
        let none = catalog.filter_by_sector(Vec::<String>::new());
        assert!(none.is_empty());
        assert_eq!(none.headers(), catalog.headers());
    }

    #[test]
    fn all_sectors_keeps_order() {
        let catalog = sample_catalog();
        let all = catalog.filter_by_sector(catalog.list_sectors());
        assert_eq!(all, catalog);
    }

    #[test]
    fn list_sectors_sorted_and_deduplicated() {
        let headers = vec!["Symbol".to_string(), "GICS Sector".to_string()];
        let records = vec![
            vec!["B".to_string(), "Utilities".to_string()],
            vec!["A".to_string(), "Energy".to_string()],
            vec!["C".to_string(), "Utilities".to_string()],
        ];
        let catalog = ConstituentCatalog::from_table(headers, records).unwrap();
        let sectors: Vec<String> = catalog.list_sectors().into_iter().collect();
        assert_eq!(sectors, vec!["Energy", "Utilities"]);
    }

    #[test]
    fn companies_follow_sector_filter() {
        let catalog = sample_catalog();
        let names = catalog.filter_by_sector(["Energy", "Tech"]).list_companies();
        assert_eq!(names, vec!["Apple Inc.", "ExxonMobil"]);
    }

    #[test]
    fn filter_by_company_preserves_order() {
        let catalog = sample_catalog();
        let picked = catalog.filter_by_company(["ExxonMobil", "Apple Inc."]);
        assert_eq!(picked.symbols(), vec!["AAPL", "XOM"]);
    }

    #[test]
    fn duplicate_symbol_rejected() {
        let headers = vec!["Symbol".to_string()];
        let records = vec![vec!["AAPL".to_string()], vec!["AAPL".to_string()]];
        let err = ConstituentCatalog::from_table(headers, records).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateSymbol(s) if s == "AAPL"));
    }

    #[test]
    fn extra_cells_are_not_dropped() {
        let headers = vec!["Symbol".to_string(), "Security".to_string()];
        let records = vec![
            vec!["AAPL".to_string(), "Apple Inc.".to_string()],
            vec!["XOM".to_string(), "ExxonMobil".to_string(), "Energy".to_string()],
        ];
        let err = ConstituentCatalog::from_table(headers, records).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::RaggedRow { row: 2, expected: 2, found: 3 }
        ));
    }

    #[test]
    fn missing_symbol_column_rejected() {
        let err = ConstituentCatalog::from_table(vec!["Ticker".into()], vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn(_)));
    }

    #[test]
    fn dimensions_and_lookup() {
        let catalog = sample_catalog();
        assert_eq!(catalog.dimensions(), (3, 4));
        assert_eq!(catalog.security_for("JPM"), Some("JPMorgan Chase"));
        assert_eq!(catalog.security_for("MSFT"), None);
        assert_eq!(catalog.head(2).symbols(), vec!["AAPL", "JPM"]);
    }
}
