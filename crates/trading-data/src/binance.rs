//! Binance public market-data feed.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use trading_core::error::FeedError;
use trading_core::traits::PriceFeed;
use trading_core::types::{Candle, Timeframe};
use tracing::debug;

/// Default REST endpoint.
pub const BINANCE_BASE_URL: &str = "https://api.binance.com";

/// Which public endpoint to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Latest kline from `/api/v3/klines`
    #[default]
    Klines,
    /// Last trade price from `/api/v3/ticker/price`, promoted to a candle
    Ticker,
}

/// Binance feed settings.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    pub base_url: String,
    pub symbol: String,
    pub interval: Timeframe,
    pub kind: FeedKind,
    pub timeout: Duration,
}

impl BinanceConfig {
    pub fn new(symbol: impl Into<String>, interval: Timeframe) -> Self {
        Self {
            base_url: BINANCE_BASE_URL.into(),
            symbol: symbol.into(),
            interval,
            kind: FeedKind::default(),
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    #[allow(dead_code)]
    symbol: String,
    price: String,
}

/// Polls the latest candle for one symbol over unsigned public endpoints.
pub struct BinanceFeed {
    config: BinanceConfig,
    client: Client,
    name: String,
}

impl BinanceFeed {
    pub fn new(config: BinanceConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("regimebot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Connection(e.to_string()))?;
        let name = format!("binance:{}:{}", config.symbol, config.interval);
        Ok(Self {
            config,
            client,
            name,
        })
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<String, FeedError> {
        let url = format!("{}{}", self.config.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| FeedError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Status { status, body });
        }

        resp.text()
            .await
            .map_err(|e| FeedError::Connection(e.to_string()))
    }

    async fn latest_kline(&self) -> Result<Candle, FeedError> {
        let params = [
            ("symbol", self.config.symbol.clone()),
            ("interval", self.config.interval.to_string()),
            ("limit", "1".to_string()),
        ];
        let body = self.get("/api/v3/klines", &params).await?;
        parse_klines(&body)?
            .pop()
            .ok_or_else(|| FeedError::Parse("empty kline response".into()))
    }

    async fn latest_ticker(&self) -> Result<Candle, FeedError> {
        let params = [("symbol", self.config.symbol.clone())];
        let body = self.get("/api/v3/ticker/price", &params).await?;
        let price = parse_ticker(&body)?;
        Ok(Candle::from_price(price, chrono::Utc::now().timestamp_millis()))
    }
}

#[async_trait]
impl PriceFeed for BinanceFeed {
    async fn next_candle(&mut self) -> Result<Candle, FeedError> {
        let candle = match self.config.kind {
            FeedKind::Klines => self.latest_kline().await?,
            FeedKind::Ticker => self.latest_ticker().await?,
        };
        debug!(feed = %self.name, close = candle.close, open_time = candle.open_time, "fetched candle");
        Ok(candle)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Parse a `/api/v3/klines` body.
///
/// Each kline is an array: open time, open, high, low, close, volume, close
/// time, then fields that are ignored. Prices are JSON strings.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>, FeedError> {
    let rows: Vec<Vec<Value>> =
        serde_json::from_str(body).map_err(|e| FeedError::Parse(e.to_string()))?;

    rows.iter()
        .map(|row| {
            if row.len() < 7 {
                return Err(FeedError::Parse(format!(
                    "kline has {} fields, expected at least 7",
                    row.len()
                )));
            }
            Ok(Candle::new(
                as_i64(&row[0])?,
                as_f64(&row[1])?,
                as_f64(&row[2])?,
                as_f64(&row[3])?,
                as_f64(&row[4])?,
                as_f64(&row[5])?,
                as_i64(&row[6])?,
            ))
        })
        .collect()
}

/// Parse a `/api/v3/ticker/price` body.
pub fn parse_ticker(body: &str) -> Result<f64, FeedError> {
    let ticker: TickerPrice =
        serde_json::from_str(body).map_err(|e| FeedError::Parse(e.to_string()))?;
    ticker
        .price
        .parse()
        .map_err(|_| FeedError::Parse(format!("invalid price {:?}", ticker.price)))
}

fn as_f64(value: &Value) -> Result<f64, FeedError> {
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|_| FeedError::Parse(format!("invalid number {:?}", s))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| FeedError::Parse(format!("invalid number {}", n))),
        other => Err(FeedError::Parse(format!("expected number, got {}", other))),
    }
}

fn as_i64(value: &Value) -> Result<i64, FeedError> {
    value
        .as_i64()
        .ok_or_else(|| FeedError::Parse(format!("expected timestamp, got {}", value)))
}
