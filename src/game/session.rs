//! Prediction session state machine.
//!
//! One `Session` is one game: a position inside an immutable price
//! series, a score, and a three-state lifecycle. The presentation layer
//! drives it through `submit_prediction` and `advance_day` and reads
//! everything else through accessors; nothing here touches the network
//! or the terminal.

use tracing::debug;

use crate::types::{
    Direction, GameError, GameSummary, PredictionOutcome, PricePoint, SessionState, TimeSeries,
};

/// A single game in progress.
///
/// The session owns its series and never mutates it; all game progress
/// lives in `current_index`, the counters, and `state`.
#[derive(Debug, Clone)]
pub struct Session {
    symbol: String,
    series: TimeSeries,
    current_index: usize,
    score: u32,
    total_predictions: u32,
    state: SessionState,
}

impl Session {
    /// Start a session at `start_index`. Callers obtain the index from
    /// the start-point selector, which guarantees it is in range; a
    /// degenerate index at (or past) the end of the series produces a
    /// session that is already `Ended`.
    pub fn new(symbol: impl Into<String>, series: TimeSeries, start_index: usize) -> Self {
        let symbol = symbol.into();
        let last = series.last_index().unwrap_or(0);
        let current_index = start_index.min(last);
        let state = if series.is_empty() || current_index == last {
            SessionState::Ended
        } else {
            SessionState::AwaitingPrediction
        };

        debug!(
            symbol = %symbol,
            start_index = current_index,
            days = series.len(),
            "Session created"
        );

        Self {
            symbol,
            series,
            current_index,
            score: 0,
            total_predictions: 0,
            state,
        }
    }

    // -- Accessors -------------------------------------------------------

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ended(&self) -> bool {
        self.state == SessionState::Ended
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_predictions(&self) -> u32 {
        self.total_predictions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The trading day the player currently stands on.
    pub fn current(&self) -> Option<&PricePoint> {
        self.series.get(self.current_index)
    }

    /// The next trading day, revealed only while showing a result.
    pub fn revealed(&self) -> Option<&PricePoint> {
        match self.state {
            SessionState::ShowingResult => self.series.get(self.current_index + 1),
            _ => None,
        }
    }

    /// Up to `len` trailing points ending at the current day, for the
    /// chart.
    pub fn chart_window(&self, len: usize) -> &[PricePoint] {
        self.series.window_ending_at(self.current_index, len)
    }

    /// Percentage of correct predictions so far; 0.0 before the first
    /// prediction.
    pub fn accuracy(&self) -> f64 {
        if self.total_predictions == 0 {
            0.0
        } else {
            (self.score as f64 / self.total_predictions as f64) * 100.0
        }
    }

    /// Scorecard for this session. Readable in any state; final once the
    /// session has ended.
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            symbol: self.symbol.clone(),
            score: self.score,
            total_predictions: self.total_predictions,
            accuracy_pct: self.accuracy(),
        }
    }

    // -- Transitions -----------------------------------------------------

    /// Score a prediction against the next trading day's close.
    ///
    /// Valid only while awaiting a prediction. Each accepted prediction
    /// is scored exactly once; a second submission without an intervening
    /// `advance_day` is rejected by state.
    pub fn submit_prediction(
        &mut self,
        guess: Direction,
    ) -> Result<PredictionOutcome, GameError> {
        match self.state {
            SessionState::Ended => Err(GameError::SessionEnded),
            SessionState::ShowingResult => Err(GameError::OutOfTurn {
                action: "predict",
                state: self.state,
            }),
            SessionState::AwaitingPrediction => {
                let current = self.current().ok_or(GameError::SessionEnded)?;
                let next = self
                    .series
                    .get(self.current_index + 1)
                    .ok_or(GameError::SessionEnded)?;

                let actual = Direction::of_move(current.close, next.close);
                let correct = guess == actual;
                let outcome = PredictionOutcome {
                    guess,
                    actual,
                    correct,
                    close_before: current.close,
                    close_after: next.close,
                    revealed_date: next.date,
                };

                if correct {
                    self.score += 1;
                }
                self.total_predictions += 1;
                self.state = SessionState::ShowingResult;

                debug!(
                    symbol = %self.symbol,
                    guess = %guess,
                    actual = %actual,
                    correct,
                    score = self.score,
                    total = self.total_predictions,
                    "Prediction scored"
                );

                Ok(outcome)
            }
        }
    }

    /// Move to the next trading day after a result has been shown.
    ///
    /// Ends the session when the final series index is reached, otherwise
    /// returns to awaiting the next prediction.
    pub fn advance_day(&mut self) -> Result<SessionState, GameError> {
        match self.state {
            SessionState::Ended => Err(GameError::SessionEnded),
            SessionState::AwaitingPrediction => Err(GameError::OutOfTurn {
                action: "advance",
                state: self.state,
            }),
            SessionState::ShowingResult => {
                self.current_index += 1;
                self.state = if Some(self.current_index) == self.series.last_index() {
                    SessionState::Ended
                } else {
                    SessionState::AwaitingPrediction
                };

                debug!(
                    symbol = %self.symbol,
                    index = self.current_index,
                    state = %self.state,
                    "Advanced a day"
                );

                Ok(self.state)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn series_of(closes: &[Decimal]) -> TimeSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: d(1 + i as u32),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000,
            })
            .collect();
        TimeSeries::from_points(points)
    }

    #[test]
    fn test_new_session_awaits_prediction() {
        let session = Session::new("AAPL", series_of(&[dec!(10), dec!(11), dec!(9)]), 0);
        assert_eq!(session.state(), SessionState::AwaitingPrediction);
        assert_eq!(session.score(), 0);
        assert_eq!(session.total_predictions(), 0);
        assert_eq!(session.current().unwrap().close, dec!(10));
    }

    #[test]
    fn test_new_session_at_last_index_is_ended() {
        let session = Session::new("AAPL", series_of(&[dec!(10), dec!(11)]), 1);
        assert!(session.is_ended());
    }

    #[test]
    fn test_correct_up_prediction_scores() {
        let mut session = Session::new("AAPL", series_of(&[dec!(10), dec!(11), dec!(9)]), 0);
        let outcome = session.submit_prediction(Direction::Up).unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.actual, Direction::Up);
        assert_eq!(session.score(), 1);
        assert_eq!(session.total_predictions(), 1);
        assert_eq!(session.state(), SessionState::ShowingResult);
    }

    #[test]
    fn test_wrong_prediction_counts_but_does_not_score() {
        let mut session = Session::new("AAPL", series_of(&[dec!(10), dec!(11), dec!(9)]), 0);
        let outcome = session.submit_prediction(Direction::Down).unwrap();
        assert!(!outcome.correct);
        assert_eq!(session.score(), 0);
        assert_eq!(session.total_predictions(), 1);
    }

    #[test]
    fn test_flat_close_counts_as_down() {
        let mut session = Session::new("AAPL", series_of(&[dec!(10), dec!(10)]), 0);
        let outcome = session.submit_prediction(Direction::Down).unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.actual, Direction::Down);
    }

    #[test]
    fn test_double_submit_is_rejected_and_not_double_counted() {
        let mut session = Session::new("AAPL", series_of(&[dec!(10), dec!(11), dec!(9)]), 0);
        session.submit_prediction(Direction::Up).unwrap();

        let err = session.submit_prediction(Direction::Up).unwrap_err();
        assert!(matches!(err, GameError::OutOfTurn { .. }));
        assert_eq!(session.score(), 1);
        assert_eq!(session.total_predictions(), 1);
    }

    #[test]
    fn test_submit_after_end_fails() {
        let mut session = Session::new("AAPL", series_of(&[dec!(10), dec!(11)]), 1);
        let err = session.submit_prediction(Direction::Up).unwrap_err();
        assert!(matches!(err, GameError::SessionEnded));
        assert_eq!(session.total_predictions(), 0);
    }

    #[test]
    fn test_advance_requires_result() {
        let mut session = Session::new("AAPL", series_of(&[dec!(10), dec!(11), dec!(9)]), 0);
        let err = session.advance_day().unwrap_err();
        assert!(matches!(
            err,
            GameError::OutOfTurn {
                action: "advance",
                ..
            }
        ));
    }

    #[test]
    fn test_advance_returns_to_awaiting() {
        let mut session = Session::new("AAPL", series_of(&[dec!(10), dec!(11), dec!(9)]), 0);
        session.submit_prediction(Direction::Up).unwrap();
        let state = session.advance_day().unwrap();
        assert_eq!(state, SessionState::AwaitingPrediction);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_advance_to_last_index_ends_session() {
        // Series [(d0,10),(d1,11),(d2,9)], start index 1: predicting
        // "down" is correct (9 < 11); advancing reaches the last index
        // and ends the game.
        let mut session = Session::new("AAPL", series_of(&[dec!(10), dec!(11), dec!(9)]), 1);
        let outcome = session.submit_prediction(Direction::Down).unwrap();
        assert!(outcome.correct);
        assert_eq!(session.score(), 1);

        let state = session.advance_day().unwrap();
        assert_eq!(state, SessionState::Ended);
        assert_eq!(session.current_index(), 2);
        assert!(session.is_ended());

        assert!(matches!(
            session.advance_day().unwrap_err(),
            GameError::SessionEnded
        ));
    }

    #[test]
    fn test_revealed_only_while_showing_result() {
        let mut session = Session::new("AAPL", series_of(&[dec!(10), dec!(11), dec!(9)]), 0);
        assert!(session.revealed().is_none());

        session.submit_prediction(Direction::Up).unwrap();
        assert_eq!(session.revealed().unwrap().close, dec!(11));

        session.advance_day().unwrap();
        assert!(session.revealed().is_none());
    }

    #[test]
    fn test_chart_window_tracks_current_day() {
        let closes: Vec<Decimal> = (1..=20).map(Decimal::from).collect();
        let mut session = Session::new("AAPL", series_of(&closes), 10);
        let window = session.chart_window(7);
        assert_eq!(window.len(), 7);
        assert_eq!(window.last().unwrap().close, dec!(11));

        session.submit_prediction(Direction::Up).unwrap();
        session.advance_day().unwrap();
        assert_eq!(session.chart_window(7).last().unwrap().close, dec!(12));
    }

    #[test]
    fn test_accuracy_exact() {
        // 3 correct out of 4 is exactly 75.0%
        let closes = [
            dec!(10),
            dec!(11), // up
            dec!(12), // up
            dec!(11), // down
            dec!(13), // up
        ];
        let mut session = Session::new("AAPL", series_of(&closes), 0);
        for guess in [Direction::Up, Direction::Up, Direction::Down, Direction::Down] {
            session.submit_prediction(guess).unwrap();
            session.advance_day().unwrap();
        }
        assert!(session.is_ended());
        assert_eq!(session.score(), 3);
        assert_eq!(session.total_predictions(), 4);
        assert_eq!(session.accuracy(), 75.0);

        let summary = session.summary();
        assert_eq!(summary.score, 3);
        assert_eq!(summary.total_predictions, 4);
        assert_eq!(summary.accuracy_pct, 75.0);
    }

    #[test]
    fn test_accuracy_zero_predictions() {
        let session = Session::new("AAPL", series_of(&[dec!(10), dec!(11)]), 0);
        assert_eq!(session.accuracy(), 0.0);
        assert_eq!(session.summary().accuracy_pct, 0.0);
    }

    #[test]
    fn test_walk_full_series() {
        let closes: Vec<Decimal> = (1..=10).map(Decimal::from).collect();
        let mut session = Session::new("AAPL", series_of(&closes), 0);
        let mut predictions = 0;
        while !session.is_ended() {
            session.submit_prediction(Direction::Up).unwrap();
            session.advance_day().unwrap();
            predictions += 1;
        }
        // 10 points from index 0: 9 predictions, all rising, all correct
        assert_eq!(predictions, 9);
        assert_eq!(session.score(), 9);
        assert_eq!(session.accuracy(), 100.0);
    }
}
