//! Domain types for IndexLens

pub mod bar;
pub mod constituent;

pub use bar::{PriceBar, PriceSeries};
pub use constituent::{ConstituentRow, GICS_SECTOR, GICS_SUB_INDUSTRY, SECURITY, SYMBOL};
