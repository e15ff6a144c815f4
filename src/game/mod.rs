//! Game core: start-point selection and the prediction session.
//!
//! `start_game` is the one entry point the presentation layer needs:
//! sanitize the symbol, load the series, pick a start point, build the
//! session. Everything downstream of that is synchronous state-machine
//! work on the `Session`.

pub mod selector;
pub mod session;

use chrono::NaiveDate;
use rand::Rng;
use tracing::info;

use crate::provider::{sanitize_symbol, MarketDataProvider};
use crate::types::GameError;

pub use selector::SelectorConfig;
pub use session::Session;

/// Start a fresh game: one provider fetch, one random start point, one
/// new session. Any failure leaves no session behind; the caller simply
/// returns to its pre-game state.
pub async fn start_game<R: Rng>(
    provider: &dyn MarketDataProvider,
    raw_symbol: &str,
    today: NaiveDate,
    cfg: &SelectorConfig,
    rng: &mut R,
) -> Result<Session, GameError> {
    let symbol = sanitize_symbol(raw_symbol)?;

    let series = provider.fetch_daily(&symbol).await?;
    let start_index = selector::select_start(&series, today, cfg, rng)?;

    info!(
        symbol = %symbol,
        provider = provider.name(),
        days = series.len(),
        start_index,
        start_date = %series.get(start_index).map(|p| p.date.to_string()).unwrap_or_default(),
        "Game started"
    );

    Ok(Session::new(symbol, series, start_index))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
