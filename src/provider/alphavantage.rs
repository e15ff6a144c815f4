//! Alpha Vantage daily time-series integration.
//!
//! Free-tier market data with strict request quotas. One request per
//! game start, full daily history per request.
//!
//! API docs: https://www.alphavantage.co/documentation/#daily
//! Base URL: https://www.alphavantage.co/query
//! Quota signals arrive in-band as "Note"/"Information" JSON members
//! rather than HTTP status codes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::MarketDataProvider;
use crate::types::{GameError, PricePoint, TimeSeries};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const PROVIDER_NAME: &str = "alphavantage";

// ---------------------------------------------------------------------------
// API response types (Alpha Vantage JSON -> Rust)
// ---------------------------------------------------------------------------

/// Top-level shape of a `TIME_SERIES_DAILY` response. Exactly one of the
/// members is populated: the series on success, or one of three in-band
/// error/informational markers.
#[derive(Debug, Deserialize)]
struct DailyResponse {
    /// Present for unknown or malformed symbols.
    #[serde(rename = "Error Message")]
    error_message: Option<String>,

    /// Present when the per-minute quota is exhausted.
    #[serde(rename = "Note")]
    note: Option<String>,

    /// Present when the daily quota is exhausted.
    #[serde(rename = "Information")]
    information: Option<String>,

    /// Per-date bar mapping, keyed by "YYYY-MM-DD".
    #[serde(rename = "Time Series (Daily)")]
    series: Option<BTreeMap<String, RawDailyBar>>,
}

/// One day's bar as Alpha Vantage ships it: all five fields are strings.
#[derive(Debug, Deserialize)]
struct RawDailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Alpha Vantage market-data client.
pub struct AlphaVantageClient {
    http: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
    output_size: String,
}

impl AlphaVantageClient {
    /// Create a new client. The key comes from configuration, never from
    /// a constant baked into the binary.
    pub fn new(
        api_key: String,
        base_url: impl Into<String>,
        timeout_secs: u64,
        output_size: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("updown/0.1.0 (stock-prediction-game)")
            .build()
            .context("Failed to build HTTP client for Alpha Vantage")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
            timeout_secs,
            output_size: output_size.into(),
        })
    }

    /// Map a transport failure to the game error taxonomy. A timed-out
    /// request is reported distinctly from other network failures.
    fn classify(&self, err: reqwest::Error) -> GameError {
        if err.is_timeout() {
            GameError::Timeout(self.timeout_secs)
        } else {
            GameError::NetworkError(err.to_string())
        }
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageClient {
    async fn fetch_daily(&self, symbol: &str) -> Result<TimeSeries, GameError> {
        let url = format!(
            "{}?function=TIME_SERIES_DAILY&symbol={}&apikey={}&outputsize={}",
            self.base_url,
            urlencoding::encode(symbol),
            self.api_key,
            self.output_size,
        );

        // Deliberately not logging the URL: it carries the API key.
        debug!(symbol, provider = PROVIDER_NAME, "Requesting daily series");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !resp.status().is_success() {
            return Err(GameError::NetworkError(format!(
                "Alpha Vantage returned HTTP {}",
                resp.status()
            )));
        }

        let body: DailyResponse = resp.json().await.map_err(|e| self.classify(e))?;

        let series = parse_daily(symbol, body)?;
        info!(symbol, days = series.len(), "Daily series loaded");
        Ok(series)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Interpret a decoded response: surface the in-band error markers, then
/// convert the per-date mapping into an ordered `TimeSeries`.
fn parse_daily(symbol: &str, body: DailyResponse) -> Result<TimeSeries, GameError> {
    if let Some(msg) = body.error_message {
        debug!(symbol, msg = %msg, "Provider rejected the symbol");
        return Err(GameError::InvalidSymbol(symbol.to_string()));
    }
    if body.note.is_some() || body.information.is_some() {
        return Err(GameError::RateLimited);
    }

    let raw = body
        .series
        .ok_or_else(|| GameError::NoData(symbol.to_string()))?;

    let mut points = Vec::with_capacity(raw.len());
    for (date, bar) in &raw {
        match parse_point(date, bar) {
            Ok(point) => points.push(point),
            // Shape validation only: a malformed entry is dropped, the
            // rest of the history stays usable.
            Err(reason) => warn!(symbol, date = %date, reason, "Skipping malformed entry"),
        }
    }

    if points.is_empty() {
        return Err(GameError::NoData(symbol.to_string()));
    }

    Ok(TimeSeries::from_points(points))
}

fn parse_point(date: &str, bar: &RawDailyBar) -> Result<PricePoint, &'static str> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| "unparseable date")?;
    let open: Decimal = bar.open.parse().map_err(|_| "unparseable open")?;
    let high: Decimal = bar.high.parse().map_err(|_| "unparseable high")?;
    let low: Decimal = bar.low.parse().map_err(|_| "unparseable low")?;
    let close: Decimal = bar.close.parse().map_err(|_| "unparseable close")?;
    let volume: u64 = bar.volume.parse().map_err(|_| "unparseable volume")?;

    Ok(PricePoint {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
