//! Market data providers.
//!
//! Defines the `MarketDataProvider` trait and provides the Alpha Vantage
//! implementation. The game core only ever sees the trait, so tests can
//! substitute a deterministic in-memory provider.

pub mod alphavantage;

use async_trait::async_trait;

use crate::types::{GameError, TimeSeries};

/// Abstraction over daily price-history sources.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the full daily history for a ticker symbol, sorted ascending
    /// by date.
    async fn fetch_daily(&self, symbol: &str) -> Result<TimeSeries, GameError>;

    /// Provider name for logging and identification.
    fn name(&self) -> &str;
}

/// Normalise raw player input into a ticker symbol: uppercase, letters
/// only, at most five characters (the same rules the original input field
/// enforced).
///
/// Fails with `InvalidSymbol` when nothing usable remains.
pub fn sanitize_symbol(raw: &str) -> Result<String, GameError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .take(5)
        .collect();

    if cleaned.is_empty() {
        return Err(GameError::InvalidSymbol(raw.trim().to_string()));
    }
    Ok(cleaned)
}
