//! Shared types for the UPDOWN game.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that provider, game, and UI
//! modules can depend on them without circular references.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Price data
// ---------------------------------------------------------------------------

/// One trading day of a daily price history. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl fmt::Display for PricePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} O:{} H:{} L:{} C:{} vol:{}",
            self.date, self.open, self.high, self.low, self.close, self.volume,
        )
    }
}

/// An ordered daily price history.
///
/// Invariant: dates are strictly increasing, no duplicates. The
/// constructor sorts and deduplicates, so any `TimeSeries` handed out
/// satisfies `points[i].date < points[i+1].date` for all i.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    points: Vec<PricePoint>,
}

impl TimeSeries {
    /// Build a series from unordered points. Sorts ascending by date and
    /// drops duplicate dates (first occurrence wins after the sort).
    pub fn from_points(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Index of the final point, or None for an empty series.
    pub fn last_index(&self) -> Option<usize> {
        self.points.len().checked_sub(1)
    }

    /// Index of the latest point dated on or before `date`.
    ///
    /// Returns None when `date` predates the whole series. Because the
    /// series is sorted, the closest on-or-before date is the last one
    /// that satisfies the bound.
    pub fn closest_index_on_or_before(&self, date: NaiveDate) -> Option<usize> {
        let n = self.points.partition_point(|p| p.date <= date);
        n.checked_sub(1)
    }

    /// Up to `len` consecutive points ending at (and including) `index`.
    /// Shorter at the start of the series; empty if `index` is out of range.
    pub fn window_ending_at(&self, index: usize, len: usize) -> &[PricePoint] {
        if index >= self.points.len() {
            return &[];
        }
        let end = index + 1;
        let start = end.saturating_sub(len);
        &self.points[start..end]
    }
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

/// A player's call on the next trading day's close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// The opposite direction.
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// The realised direction of a close-to-close move. A flat close
    /// counts as Down.
    pub fn of_move(current_close: Decimal, next_close: Decimal) -> Self {
        if next_close > current_close {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// Parse terminal input into a Direction (case-insensitive).
impl std::str::FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            _ => Err(anyhow::anyhow!("Unknown direction: {s}")),
        }
    }
}

/// Result of a single scored prediction, returned by the session and
/// rendered by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub guess: Direction,
    pub actual: Direction,
    pub correct: bool,
    /// Close on the day the prediction was made.
    pub close_before: Decimal,
    /// Close on the revealed next trading day.
    pub close_after: Decimal,
    /// Date of the revealed next trading day.
    pub revealed_date: NaiveDate,
}

impl PredictionOutcome {
    /// Signed close-to-close change.
    pub fn change(&self) -> Decimal {
        self.close_after - self.close_before
    }

    /// Signed percentage change, rounded to two decimal places.
    /// Zero when the prior close is zero.
    pub fn percent_change(&self) -> Decimal {
        if self.close_before.is_zero() {
            return Decimal::ZERO;
        }
        (self.change() / self.close_before * Decimal::from(100)).round_dp(2)
    }
}

impl fmt::Display for PredictionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.correct { "correct" } else { "incorrect" };
        let sign = if self.change() >= Decimal::ZERO { "+" } else { "" };
        write!(
            f,
            "{} (guessed {}, went {}) {} -> {} ({sign}{}, {sign}{}%)",
            verdict,
            self.guess,
            self.actual,
            self.close_before,
            self.close_after,
            self.change(),
            self.percent_change(),
        )
    }
}

// ---------------------------------------------------------------------------
// Session state & summary
// ---------------------------------------------------------------------------

/// Lifecycle state of a prediction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Ready to accept the next prediction.
    AwaitingPrediction,
    /// A prediction has been scored; waiting to advance to the next day.
    ShowingResult,
    /// The series is exhausted. Terminal.
    Ended,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::AwaitingPrediction => write!(f, "awaiting a prediction"),
            SessionState::ShowingResult => write!(f, "showing a result"),
            SessionState::Ended => write!(f, "ended"),
        }
    }
}

/// Final scorecard for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub symbol: String,
    pub score: u32,
    pub total_predictions: u32,
    /// Percentage of correct predictions (0.0 when none were made).
    pub accuracy_pct: f64,
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} correct ({:.1}%)",
            self.symbol, self.score, self.total_predictions, self.accuracy_pct,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for UPDOWN.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid stock symbol: {0}")]
    InvalidSymbol(String),

    #[error("Provider rate limit reached. Wait a minute and try again")]
    RateLimited,

    #[error("No daily price data available for {0}")]
    NoData(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Not enough trading history before the start date (need at least {required} prior days)")]
    InsufficientHistory { required: usize },

    #[error("The game has already ended")]
    SessionEnded,

    #[error("Cannot {action} while the session is {state}")]
    OutOfTurn {
        action: &'static str,
        state: SessionState,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
