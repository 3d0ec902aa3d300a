//! Crate-level error type.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::data::DataError;
use crate::export::ExportError;
use crate::indicators::AugmentError;
use crate::window::WindowError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Augment(#[from] AugmentError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
