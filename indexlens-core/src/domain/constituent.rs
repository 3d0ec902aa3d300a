//! Constituent rows as scraped from the index membership table.

use std::sync::Arc;

/// Column carrying the ticker symbol (unique per catalog).
pub const SYMBOL: &str = "Symbol";
/// Column carrying the company name.
pub const SECURITY: &str = "Security";
/// Column carrying the GICS sector label.
pub const GICS_SECTOR: &str = "GICS Sector";
/// Column carrying the GICS sub-industry label.
pub const GICS_SUB_INDUSTRY: &str = "GICS Sub-Industry";

/// One row of the constituent table.
///
/// Values are kept verbatim and in source column order. The header list is
/// shared by every row of a catalog, so cloning a row is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstituentRow {
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl ConstituentRow {
    /// Build a row, padding a short record with empty cells.
    ///
    /// Callers reject records wider than `headers` before building rows.
    pub(crate) fn new(headers: Arc<[String]>, mut values: Vec<String>) -> Self {
        debug_assert!(values.len() <= headers.len());
        values.resize(headers.len(), String::new());
        Self { headers, values }
    }

    /// Value of a column by header name.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == field)
            .map(|i| self.values[i].as_str())
    }

    pub fn symbol(&self) -> &str {
        self.get(SYMBOL).unwrap_or_default()
    }

    pub fn security(&self) -> &str {
        self.get(SECURITY).unwrap_or_default()
    }

    pub fn gics_sector(&self) -> &str {
        self.get(GICS_SECTOR).unwrap_or_default()
    }

    pub fn gics_sub_industry(&self) -> &str {
        self.get(GICS_SUB_INDUSTRY).unwrap_or_default()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}
