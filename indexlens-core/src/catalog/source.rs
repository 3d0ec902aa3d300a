//! Catalog sources.
//!
//! The `CatalogSource` trait abstracts over where the membership table comes
//! from (the live web page, a saved HTML page, a previously exported CSV) so
//! the scraping detail can be swapped for a fixture in tests.

use std::path::{Path, PathBuf};

use super::html::parse_first_table;
use super::CatalogError;

/// Header row plus records, before uniqueness validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

/// Trait for constituent table sources.
pub trait CatalogSource: Send + Sync {
    /// Human-readable origin, used in logs and error messages.
    fn describe(&self) -> String;

    /// Fetch and parse the table.
    fn load_table(&self) -> Result<RawTable, CatalogError>;
}

/// In-memory table, mostly for tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    table: RawTable,
}

impl StaticSource {
    pub fn new(headers: &[&str], records: &[&[&str]]) -> Self {
        Self {
            table: RawTable {
                headers: headers.iter().map(|h| h.to_string()).collect(),
                records: records
                    .iter()
                    .map(|r| r.iter().map(|v| v.to_string()).collect())
                    .collect(),
            },
        }
    }
}

impl CatalogSource for StaticSource {
    fn describe(&self) -> String {
        "static table".into()
    }

    fn load_table(&self) -> Result<RawTable, CatalogError> {
        Ok(self.table.clone())
    }
}

/// An HTML page already in memory (a saved copy of the constituents page).
#[derive(Debug, Clone)]
pub struct HtmlSource {
    origin: String,
    html: String,
}

impl HtmlSource {
    pub fn new(origin: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            html: html.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let html = std::fs::read_to_string(path).map_err(|e| CatalogError::SourceUnavailable {
            origin: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(path.display().to_string(), html))
    }
}

impl CatalogSource for HtmlSource {
    fn describe(&self) -> String {
        self.origin.clone()
    }

    fn load_table(&self) -> Result<RawTable, CatalogError> {
        parse_first_table(&self.html, &self.origin)
    }
}

/// A CSV file previously written by the exporter.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_table(&self) -> Result<RawTable, CatalogError> {
        let unavailable = |reason: String| CatalogError::SourceUnavailable {
            origin: self.describe(),
            reason,
        };
        let bytes = std::fs::read(&self.path).map_err(|e| unavailable(e.to_string()))?;
        crate::export::read_table(&bytes).map_err(|e| unavailable(e.to_string()))
    }
}
