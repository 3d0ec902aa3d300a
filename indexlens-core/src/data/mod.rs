//! Price data — providers, circuit breaker and batch fetching.

pub mod circuit_breaker;
pub mod fetch;
pub mod memory;
pub mod provider;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use fetch::{analyze, fetch_many, FetchBatch};
pub use memory::InMemoryProvider;
pub use provider::{DataError, FetchProgress, PriceProvider, TracingProgress};
pub use yahoo::YahooProvider;
