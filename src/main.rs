//! UPDOWN: Historical Stock Prediction Game
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the market-data client, and runs the interactive game loop
//! with graceful shutdown on Ctrl+C or end-of-input.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use updown::config::AppConfig;
use updown::game::{start_game, SelectorConfig, Session};
use updown::provider::alphavantage::AlphaVantageClient;
use updown::provider::MarketDataProvider;
use updown::types::Direction;
use updown::ui;

const BANNER: &str = r#"
 _   _ ____  ____   ___  __        __ _   _
| | | |  _ \|  _ \ / _ \ \ \      / /| \ | |
| | | | |_) | | | | | | | \ \ /\ / / |  \| |
| |_| |  __/| |_| | |_| |  \ V  V /  | |\  |
 \___/|_|   |____/ \___/    \_/\_/   |_| \_|

  Guess tomorrow's close. Beat the market.
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    println!("{BANNER}");
    info!(
        provider_base_url = %cfg.provider.base_url,
        timeout_secs = cfg.provider.timeout_secs,
        "UPDOWN starting up"
    );

    // The credential is resolved from the environment, never embedded.
    let api_key = AppConfig::resolve_env(&cfg.provider.api_key_env)?;
    let client = AlphaVantageClient::new(
        api_key,
        cfg.provider.base_url.clone(),
        cfg.provider.timeout_secs,
        cfg.provider.output_size.clone(),
    )
    .context("Failed to initialise market-data client")?;

    let selector_cfg = SelectorConfig {
        min_days_ago: cfg.game.min_days_ago,
        max_days_ago: cfg.game.max_days_ago,
        max_weekday_attempts: cfg.game.weekday_attempts,
        min_start_index: cfg.game.min_start_index,
    };

    run(&client, &selector_cfg, cfg.ui.chart_window).await
}

/// Interactive loop: one ticker prompt per game, one session per game.
/// A failed start leaves no session and falls back to the prompt.
async fn run(
    provider: &dyn MarketDataProvider,
    selector_cfg: &SelectorConfig,
    chart_window: usize,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut rng = StdRng::from_entropy();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    'games: loop {
        println!();
        println!("Enter a ticker to play (or 'quit'):");

        let input = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break 'games, // end of input
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break 'games;
            }
        };

        let input = input.trim().to_string();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
            break 'games;
        }

        let today = chrono::Local::now().date_naive();
        let mut session =
            match start_game(provider, &input, today, selector_cfg, &mut rng).await {
                Ok(session) => session,
                Err(e) => {
                    warn!(error = %e, "Could not start a game");
                    println!("{e}");
                    continue 'games;
                }
            };

        println!();
        println!("Playing {}. You start on {}.", session.symbol(), current_date_line(&session));

        while !session.is_ended() {
            println!();
            print!("{}", ui::render_chart(session.chart_window(chart_window)));
            println!(
                "{} | score {}/{}",
                current_date_line(&session),
                session.score(),
                session.total_predictions(),
            );
            println!("Will the next close be UP or DOWN? [u/d, or 'quit']");

            let answer = tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => line,
                    None => break 'games,
                },
                _ = &mut shutdown => {
                    info!("Shutdown signal received.");
                    break 'games;
                }
            };

            if answer.trim().eq_ignore_ascii_case("quit") {
                println!("{}", ui::render_summary(&session.summary()));
                continue 'games;
            }

            let guess = match Direction::from_str(&answer) {
                Ok(guess) => guess,
                Err(_) => {
                    println!("Type 'u' for up or 'd' for down.");
                    continue;
                }
            };

            let outcome = match session.submit_prediction(guess) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "Prediction rejected");
                    continue;
                }
            };
            println!("{}", ui::render_outcome(&outcome));

            if let Err(e) = session.advance_day() {
                warn!(error = %e, "Could not advance");
                break;
            }
        }

        if session.is_ended() {
            println!();
            println!("{}", ui::render_summary(&session.summary()));
        }
    }

    info!("UPDOWN shut down cleanly.");
    Ok(())
}

fn current_date_line(session: &Session) -> String {
    session
        .current()
        .map(|p| ui::long_date(p.date))
        .unwrap_or_else(|| "unknown date".to_string())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("updown=info"));

    let json_logging = std::env::var("UPDOWN_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
