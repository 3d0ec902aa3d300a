//! Batch fetch orchestrator — per-symbol isolation with optional parallelism.
//!
//! Every symbol gets its own `Result`; one failure never blocks or alters the
//! others. Outcomes are returned in input order whether the fetches ran
//! sequentially or on the rayon pool.

use rayon::prelude::*;

use super::provider::{DataError, FetchProgress, PriceProvider};
use crate::domain::PriceSeries;
use crate::indicators::MovingAverageAugmenter;
use crate::window::DateWindow;

/// Per-symbol outcomes of a batch fetch, in input order.
#[derive(Debug)]
pub struct FetchBatch {
    pub window: DateWindow,
    pub outcomes: Vec<(String, Result<PriceSeries, DataError>)>,
}

impl FetchBatch {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &PriceSeries> {
        self.outcomes.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &DataError)> {
        self.outcomes
            .iter()
            .filter_map(|(s, r)| r.as_ref().err().map(|e| (s.as_str(), e)))
    }

    pub fn get(&self, symbol: &str) -> Option<&Result<PriceSeries, DataError>> {
        self.outcomes.iter().find(|(s, _)| s == symbol).map(|(_, r)| r)
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed().next().is_none()
    }

    /// True when the batch was non-empty and nothing came back.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded().next().is_none()
    }
}

/// Fetch every symbol over `window`.
pub fn fetch_many(
    provider: &dyn PriceProvider,
    symbols: &[String],
    window: DateWindow,
    parallel: bool,
    progress: &dyn FetchProgress,
) -> FetchBatch {
    fetch_each(provider, symbols, window, parallel, progress, |_| {})
}

/// Fetch every symbol and augment each series with moving averages.
pub fn analyze(
    provider: &dyn PriceProvider,
    symbols: &[String],
    window: DateWindow,
    augmenter: &MovingAverageAugmenter,
    parallel: bool,
    progress: &dyn FetchProgress,
) -> FetchBatch {
    fetch_each(provider, symbols, window, parallel, progress, |series| {
        augmenter.augment(series)
    })
}

fn fetch_each<F>(
    provider: &dyn PriceProvider,
    symbols: &[String],
    window: DateWindow,
    parallel: bool,
    progress: &dyn FetchProgress,
    post: F,
) -> FetchBatch
where
    F: Fn(&mut PriceSeries) + Sync,
{
    let total = symbols.len();
    tracing::debug!(provider = provider.name(), total, %window, "fetching batch");

    let fetch_one = |(i, symbol): (usize, &String)| {
        progress.on_start(symbol, i, total);
        // A blocked provider is not asked again for the rest of the batch.
        let result = if provider.is_available() {
            provider.fetch(symbol, window).map(|mut series| {
                post(&mut series);
                series
            })
        } else {
            Err(DataError::ProviderUnavailable(provider.name().to_string()))
        };
        progress.on_complete(symbol, i, total, result.as_ref().map(PriceSeries::len));
        (symbol.clone(), result)
    };

    let outcomes: Vec<(String, Result<PriceSeries, DataError>)> = if parallel {
        symbols.par_iter().enumerate().map(fetch_one).collect()
    } else {
        symbols.iter().enumerate().map(fetch_one).collect()
    };

    let batch = FetchBatch { window, outcomes };
    let failed = batch.failed().count();
    progress.on_batch_complete(total - failed, failed, total);
    batch
}
