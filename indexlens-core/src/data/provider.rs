//! Price provider trait and structured error types.
//!
//! The `PriceProvider` trait abstracts over price sources (Yahoo Finance, an
//! in-memory fixture) so the analysis pipeline can be tested offline.

use thiserror::Error;

use crate::domain::PriceSeries;
use crate::window::DateWindow;

/// Structured error types for price fetches.
///
/// Every variant is scoped to a single symbol's fetch; callers isolate them
/// per symbol and keep processing the rest of a batch.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("no price data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped, retry in {retry_after_secs}s)")]
    CircuitBreakerTripped { retry_after_secs: u64 },

    #[error("provider {0} is not accepting requests")]
    ProviderUnavailable(String),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Trait for daily price providers.
///
/// Implementations return bars sorted by date and restricted to the window.
/// An unknown symbol or an empty result is `DataError::DataUnavailable`.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV + adjusted close bars for a symbol over a window.
    fn fetch(&self, symbol: &str, window: DateWindow) -> Result<PriceSeries, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}

/// Progress callback for multi-symbol fetches.
pub trait FetchProgress: Send + Sync {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: Result<usize, &DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that emits `tracing` events.
pub struct TracingProgress;

impl FetchProgress for TracingProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::debug!(symbol, "[{}/{}] fetching", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, result: Result<usize, &DataError>) {
        match result {
            Ok(bars) => tracing::info!(symbol, bars, "fetched"),
            Err(e) => tracing::warn!(symbol, error = %e, "fetch failed"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!(succeeded, failed, total, "batch complete");
    }
}
