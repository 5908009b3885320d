//! Quote retrieval with fallback ordering.
//! -----------------------------------------------------------------
//! ‣ Keeps third-party HTTP code in *one* place (separation of concerns).
//! ‣ Each source is a [`QuoteSource`] impl behind a shared `reqwest::Client`.
//! ‣ Sources are tried in order, each under its own timeout; the first
//!   answer wins and failures are logged and skipped.
//!
//! The engine never sees any of this: it receives the resolved
//! [`MarketSnapshot`] and nothing else.
//! -----------------------------------------------------------------

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::settings::Settings;
use crate::services::engine::MarketSnapshot;
use crate::utils::errors::ApiError;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch(&self, client: &Client, symbol: &str) -> Result<MarketSnapshot, ApiError>;
}

/// Try every configured source in order; first success wins.
pub async fn fetch_snapshot(
    client: &Client,
    settings: &Settings,
) -> Result<MarketSnapshot, ApiError> {
    let sources: [&dyn QuoteSource; 2] = [&CoinGecko, &BinanceTicker];
    let timeout = Duration::from_secs(settings.quote_timeout_secs);

    for source in sources {
        match tokio::time::timeout(timeout, source.fetch(client, &settings.symbol)).await {
            Ok(Ok(snap)) => {
                log::info!("quote from {}: {:.2}", source.name(), snap.price);
                return Ok(snap);
            }
            Ok(Err(e)) => {
                log::warn!("quote source {} failed: {e} - trying next", source.name());
            }
            Err(_) => {
                log::warn!(
                    "quote source {} timed out after {}s - trying next",
                    source.name(),
                    settings.quote_timeout_secs
                );
            }
        }
    }

    Err(ApiError::Other("all quote sources failed".into()))
}

/* ─────────────────────────────────────────  CoinGecko ────── */

pub struct CoinGecko;

#[derive(Debug, Deserialize)]
struct CoinGeckoMarket {
    current_price: f64,
    price_change_percentage_24h: Option<f64>,
    total_volume: Option<f64>,
    market_cap: Option<f64>,
}

fn coingecko_id(symbol: &str) -> &'static str {
    // only BTC pairs are served today; everything else maps to bitcoin
    let _ = symbol;
    "bitcoin"
}

#[async_trait]
impl QuoteSource for CoinGecko {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn fetch(&self, client: &Client, symbol: &str) -> Result<MarketSnapshot, ApiError> {
        let url = format!(
            "https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd&ids={}",
            coingecko_id(symbol)
        );

        let markets = client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<CoinGeckoMarket>>()
            .await?;

        let m = markets
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Other("coingecko returned an empty market list".into()))?;

        Ok(MarketSnapshot {
            price: m.current_price,
            change_24h: m.price_change_percentage_24h.unwrap_or(0.0),
            volume_24h: m.total_volume.unwrap_or(0.0),
            market_cap: m.market_cap.unwrap_or(0.0),
            source: self.name().into(),
        })
    }
}

/* ─────────────────────────────────────────  Binance 24h ticker ────── */

pub struct BinanceTicker;

#[derive(Debug, Deserialize)]
struct Binance24hTicker {
    #[serde(rename = "lastPrice")]
    last_price: String,
    #[serde(rename = "priceChangePercent")]
    price_change_percent: String,
    #[serde(rename = "quoteVolume")]
    quote_volume: String,
}

impl Binance24hTicker {
    fn parse_f64(s: &str) -> f64 {
        s.parse::<f64>().unwrap_or(0.0)
    }
}

#[async_trait]
impl QuoteSource for BinanceTicker {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn fetch(&self, client: &Client, symbol: &str) -> Result<MarketSnapshot, ApiError> {
        let url = format!(
            "https://api.binance.com/api/v3/ticker/24hr?symbol={}",
            symbol.to_uppercase()
        );

        let t = client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Binance24hTicker>()
            .await?;

        Ok(MarketSnapshot {
            price: Binance24hTicker::parse_f64(&t.last_price),
            change_24h: Binance24hTicker::parse_f64(&t.price_change_percent),
            volume_24h: Binance24hTicker::parse_f64(&t.quote_volume),
            market_cap: 0.0, // ticker endpoint carries no cap
            source: self.name().into(),
        })
    }
}
