//! IndexLens Core — index constituents, price series and moving averages.
//!
//! This crate contains the analytic core of the index dashboard:
//! - Constituent catalog scraped from the first table of a web page, with
//!   sector and company filters
//! - Date windows (one-year lookback, year-to-date)
//! - Price providers (Yahoo Finance chart API, in-memory fixture) and batch
//!   fetching with per-symbol error isolation
//! - Moving-average augmentation of price series
//! - CSV export of constituent tables and augmented series
//! - A `Session` that owns configuration, sources and the catalog cache

pub mod catalog;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod export;
pub mod indicators;
pub mod session;
pub mod window;

pub use catalog::{CatalogError, CatalogSource, ConstituentCatalog};
pub use config::{Config, ConfigError};
pub use data::{DataError, FetchBatch, PriceProvider};
pub use domain::{ConstituentRow, PriceBar, PriceSeries};
pub use error::Error;
pub use export::{from_portable_text, series_to_csv, to_portable_text, ExportError, EXPORT_FILENAME};
pub use indicators::{augment, MovingAverageAugmenter, DEFAULT_MA_WINDOWS};
pub use session::Session;
pub use window::{DateWindow, WindowError};
