//! Live constituent table from Wikipedia.
//!
//! Downloads the "List of S&P 500 companies" page and takes its first table.
//! The page layout is not under our control; when it changes the parse fails
//! with `SourceUnavailable` rather than producing a partial catalog.

use std::time::Duration;

use super::html::parse_first_table;
use super::source::{CatalogSource, RawTable};
use super::CatalogError;

pub const DEFAULT_CATALOG_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

pub struct WikipediaSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl WikipediaSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let url = url.into();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("indexlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::SourceUnavailable {
                origin: url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, url })
    }

    fn fetch_page(&self) -> Result<String, CatalogError> {
        let unavailable = |reason: String| CatalogError::SourceUnavailable {
            origin: self.url.clone(),
            reason,
        };

        tracing::info!(url = %self.url, "fetching constituent table");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status}")));
        }

        resp.text().map_err(|e| unavailable(e.to_string()))
    }
}

impl CatalogSource for WikipediaSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn load_table(&self) -> Result<RawTable, CatalogError> {
        let html = self.fetch_page()?;
        parse_first_table(&html, &self.url)
    }
}
