//! Terminal presentation.
//!
//! Pure text formatting over the game types; no I/O here. The binary
//! prints whatever these return, which keeps every view testable.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::types::{Direction, GameSummary, PredictionOutcome, PricePoint};

/// Bar width of the widest chart row.
const CHART_BAR_WIDTH: usize = 24;

/// Full date the way the game announces a trading day,
/// e.g. "Tuesday, March 3, 2026".
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Render the trailing closes as horizontal bars scaled between the
/// window's low and high. One row per trading day, most recent last.
pub fn render_chart(points: &[PricePoint]) -> String {
    if points.is_empty() {
        return String::new();
    }

    let closes: Vec<f64> = points
        .iter()
        .map(|p| p.close.to_f64().unwrap_or(0.0))
        .collect();
    let min = closes.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = closes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    let mut out = String::new();
    for (point, close) in points.iter().zip(&closes) {
        let scaled = if span > 0.0 {
            ((close - min) / span * (CHART_BAR_WIDTH - 1) as f64).round() as usize
        } else {
            CHART_BAR_WIDTH / 2
        };
        let bar = "#".repeat(1 + scaled);
        out.push_str(&format!(
            "{}  {:>10}  {}\n",
            point.date.format("%b %d"),
            format!("{:.2}", point.close),
            bar,
        ));
    }
    out
}

/// One-shot result panel shown after each prediction.
pub fn render_outcome(outcome: &PredictionOutcome) -> String {
    let headline = if outcome.correct {
        "Correct!"
    } else {
        "Incorrect."
    };
    let moved = match outcome.actual {
        Direction::Up => "rose",
        Direction::Down => "fell",
    };
    let sign = if outcome.change() >= Decimal::ZERO {
        "+"
    } else {
        "-"
    };
    format!(
        "{headline} On {} the close {moved} from ${:.2} to ${:.2} ({sign}${:.2}, {sign}{:.2}%)",
        long_date(outcome.revealed_date),
        outcome.close_before,
        outcome.close_after,
        outcome.change().abs(),
        outcome.percent_change().abs(),
    )
}

/// Final scorecard line.
pub fn render_summary(summary: &GameSummary) -> String {
    format!(
        "Game over! {} finished at {}/{} correct ({:.1}% accuracy)",
        summary.symbol, summary.score, summary.total_predictions, summary.accuracy_pct,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn point(date: NaiveDate, close: Decimal) -> PricePoint {
        PricePoint {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_long_date() {
        assert_eq!(long_date(d(3)), "Tuesday, March 3, 2026");
    }

    #[test]
    fn test_chart_empty() {
        assert_eq!(render_chart(&[]), "");
    }

    #[test]
    fn test_chart_scales_between_low_and_high() {
        let chart = render_chart(&[
            point(d(2), dec!(10)),
            point(d(3), dec!(20)),
            point(d(4), dec!(15)),
        ]);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);

        let bar_len = |line: &str| line.chars().filter(|&c| c == '#').count();
        assert_eq!(bar_len(lines[0]), 1);
        assert_eq!(bar_len(lines[1]), CHART_BAR_WIDTH);
        assert!(bar_len(lines[2]) > 1 && bar_len(lines[2]) < CHART_BAR_WIDTH);

        assert!(lines[0].contains("Mar 02"));
        assert!(lines[0].contains("10.00"));
    }

    #[test]
    fn test_chart_flat_window() {
        let chart = render_chart(&[point(d(2), dec!(10)), point(d(3), dec!(10))]);
        for line in chart.lines() {
            assert_eq!(line.chars().filter(|&c| c == '#').count(), 1 + CHART_BAR_WIDTH / 2);
        }
    }

    #[test]
    fn test_outcome_correct_up() {
        let outcome = PredictionOutcome {
            guess: Direction::Up,
            actual: Direction::Up,
            correct: true,
            close_before: dec!(225.10),
            close_after: dec!(226.90),
            revealed_date: d(3),
        };
        let text = render_outcome(&outcome);
        assert!(text.starts_with("Correct!"));
        assert!(text.contains("rose"));
        assert!(text.contains("$225.10"));
        assert!(text.contains("$226.90"));
        assert!(text.contains("+$1.80"));
        assert!(text.contains("+0.80%"));
    }

    #[test]
    fn test_outcome_incorrect_down() {
        let outcome = PredictionOutcome {
            guess: Direction::Up,
            actual: Direction::Down,
            correct: false,
            close_before: dec!(11),
            close_after: dec!(9),
            revealed_date: d(3),
        };
        let text = render_outcome(&outcome);
        assert!(text.starts_with("Incorrect."));
        assert!(text.contains("fell"));
        assert!(text.contains("-$2.00"));
        assert!(text.contains("-18.18%"));
    }

    #[test]
    fn test_summary_line() {
        let text = render_summary(&GameSummary {
            symbol: "AAPL".to_string(),
            score: 3,
            total_predictions: 4,
            accuracy_pct: 75.0,
        });
        assert!(text.contains("AAPL"));
        assert!(text.contains("3/4"));
        assert!(text.contains("75.0%"));
    }
}
