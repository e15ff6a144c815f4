//! Random start-point selection.
//!
//! Picks a historical weekday to begin a game from, then maps it onto
//! the loaded price series. Randomness is injected so the whole module
//! stays deterministic under test.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use tracing::debug;

use crate::types::{GameError, TimeSeries};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Start-point selection policy.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Closest a candidate date may be to today, in calendar days.
    pub min_days_ago: i64,
    /// Furthest a candidate date may be from today, in calendar days.
    pub max_days_ago: i64,
    /// Total sampling attempts before accepting a weekend candidate.
    pub max_weekday_attempts: u32,
    /// Minimum series index for a start point. Anything earlier leaves
    /// too little preceding data to chart.
    pub min_start_index: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_days_ago: 7,
            max_days_ago: 100,
            max_weekday_attempts: 50,
            min_start_index: 7,
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Monday through Friday, inclusive.
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Sample a random start date between `min_days_ago` and `max_days_ago`
/// calendar days before `today` (inclusive on both ends).
///
/// Redraws while the candidate lands on a weekend, up to
/// `max_weekday_attempts` total draws; if every draw lands on a weekend
/// the final candidate is used anyway. The cap-and-fall-through is
/// intentional and must not be tightened into a hard weekday guarantee.
pub fn sample_start_date<R: Rng + ?Sized>(
    today: NaiveDate,
    cfg: &SelectorConfig,
    rng: &mut R,
) -> NaiveDate {
    let mut draw = || {
        let days_ago = rng.gen_range(cfg.min_days_ago..=cfg.max_days_ago);
        today - Duration::days(days_ago)
    };

    let mut candidate = draw();
    let mut attempts = 1;
    while !is_weekday(candidate) && attempts < cfg.max_weekday_attempts {
        candidate = draw();
        attempts += 1;
    }

    debug!(
        candidate = %candidate,
        attempts,
        weekday = is_weekday(candidate),
        "Start date sampled"
    );
    candidate
}

/// Map a candidate date onto the series: the index of the closest date
/// on or before the candidate (the market may have been closed on the
/// candidate itself).
///
/// Fails with `InsufficientHistory` when no index qualifies, or when the
/// resolved index leaves fewer than `min_start_index` preceding days.
pub fn resolve_start_index(
    series: &TimeSeries,
    candidate: NaiveDate,
    cfg: &SelectorConfig,
) -> Result<usize, GameError> {
    let index = series
        .closest_index_on_or_before(candidate)
        .ok_or(GameError::InsufficientHistory {
            required: cfg.min_start_index,
        })?;

    if index < cfg.min_start_index {
        return Err(GameError::InsufficientHistory {
            required: cfg.min_start_index,
        });
    }

    debug!(candidate = %candidate, index, "Start index resolved");
    Ok(index)
}

/// Sample a start date and resolve it against the series in one step.
pub fn select_start<R: Rng + ?Sized>(
    series: &TimeSeries,
    today: NaiveDate,
    cfg: &SelectorConfig,
    rng: &mut R,
) -> Result<usize, GameError> {
    let candidate = sample_start_date(today, cfg, rng);
    resolve_start_index(series, candidate, cfg)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
