//! Analysis session — the context object every operation runs against.
//!
//! A session owns the configuration, the catalog source, the price provider
//! and the "today" anchor for date windows. The catalog is loaded at most once
//! per session and is read-only afterwards; a failed load is not cached, so the
//! next access tries again. Concurrent first accesses wait on one load.

use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;

use crate::catalog::{CatalogError, CatalogSource, ConstituentCatalog, CsvFileSource, WikipediaSource};
use crate::config::Config;
use crate::data::{
    analyze, fetch_many, CircuitBreaker, FetchBatch, FetchProgress, PriceProvider, YahooProvider,
};
use crate::error::Error;
use crate::indicators::MovingAverageAugmenter;
use crate::window::DateWindow;

pub struct Session {
    config: Config,
    catalog_source: Box<dyn CatalogSource>,
    provider: Box<dyn PriceProvider>,
    augmenter: MovingAverageAugmenter,
    today: NaiveDate,
    catalog: OnceLock<ConstituentCatalog>,
    load_lock: Mutex<()>,
}

impl Session {
    pub fn new(
        config: Config,
        catalog_source: Box<dyn CatalogSource>,
        provider: Box<dyn PriceProvider>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let augmenter = MovingAverageAugmenter::new(&config.analysis.ma_windows)?;
        Ok(Self {
            config,
            catalog_source,
            provider,
            augmenter,
            today: DateWindow::today_local(),
            catalog: OnceLock::new(),
            load_lock: Mutex::new(()),
        })
    }

    /// Live session: Wikipedia catalog (or a saved CSV export) and Yahoo prices.
    pub fn online(config: Config, catalog_file: Option<&Path>) -> Result<Self, Error> {
        let catalog_source: Box<dyn CatalogSource> = match catalog_file {
            Some(path) => Box::new(CsvFileSource::new(path)),
            None => Box::new(WikipediaSource::new(
                config.catalog.url.clone(),
                Duration::from_secs(config.catalog.timeout_secs),
            )?),
        };
        let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(
            config.prices.breaker_cooldown_secs,
        )));
        let provider = Box::new(YahooProvider::new(breaker, &config.prices)?);
        Self::new(config, catalog_source, provider)
    }

    /// Pin "today" for window computation.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn provider(&self) -> &dyn PriceProvider {
        self.provider.as_ref()
    }

    pub fn is_catalog_loaded(&self) -> bool {
        self.catalog.get().is_some()
    }

    /// The constituent catalog, loading it on first access.
    pub fn catalog(&self) -> Result<&ConstituentCatalog, CatalogError> {
        if let Some(catalog) = self.catalog.get() {
            return Ok(catalog);
        }
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished loading while we waited.
        if let Some(catalog) = self.catalog.get() {
            return Ok(catalog);
        }
        let loaded = ConstituentCatalog::load(self.catalog_source.as_ref())?;
        Ok(self.catalog.get_or_init(|| loaded))
    }

    /// One-year lookback window ending today.
    pub fn window(&self) -> Result<DateWindow, Error> {
        Ok(DateWindow::one_year_back(self.today)?)
    }

    /// Fetch and augment the given symbols over the one-year window.
    pub fn analyze(&self, symbols: &[String], progress: &dyn FetchProgress) -> Result<FetchBatch, Error> {
        let window = self.window()?;
        tracing::info!(symbols = symbols.len(), %window, "analyzing");
        Ok(analyze(
            self.provider.as_ref(),
            symbols,
            window,
            &self.augmenter,
            self.config.prices.parallel,
            progress,
        ))
    }

    /// Year-to-date series for the leading symbols of the given sectors.
    pub fn year_to_date<I, S>(&self, sectors: I, progress: &dyn FetchProgress) -> Result<FetchBatch, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let window = DateWindow::year_to_date(self.today)?;
        let symbols = self
            .catalog()?
            .filter_by_sector(sectors)
            .head(self.config.analysis.ytd_batch_size)
            .symbols();
        tracing::info!(symbols = symbols.len(), %window, "year-to-date batch");
        Ok(fetch_many(
            self.provider.as_ref(),
            &symbols,
            window,
            self.config.prices.parallel,
            progress,
        ))
    }
}
