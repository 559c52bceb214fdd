//! BRAPI Stock Quote Source
//!
//! Batch adapter for a BRAPI-compatible stock quote API:
//! `GET {base}/quote/{symbols}` with comma-joined tickers, answering
//! `{"results": [{"symbol", "regularMarketPrice", ...}]}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::ports::{QuoteSourceError, QuoteSourcePort};
use crate::domain::quote::QuoteRecord;

const SOURCE_ID: &str = "brapi";

/// Stock quote adapter.
///
/// Stateless across calls; the base URL is configurable so tests can point
/// it at a local stub server.
#[derive(Debug)]
pub struct BrapiQuoteSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl BrapiQuoteSource {
    /// Create an adapter with the given API base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, QuoteSourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QuoteSourceError::Transport {
                message: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl QuoteSourcePort for BrapiQuoteSource {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn fetch(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, QuoteRecord>, QuoteSourceError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/quote/{}", self.base_url, symbols.join(","));
        let response = self.http_client.get(&url).send().await.map_err(|e| {
            QuoteSourceError::Transport {
                message: e.to_string(),
            }
        })?;

        if !response.status().is_success() {
            return Err(QuoteSourceError::Status {
                status: response.status().as_u16(),
            });
        }

        let payload: BrapiQuoteResponse =
            response
                .json()
                .await
                .map_err(|e| QuoteSourceError::MalformedPayload {
                    message: e.to_string(),
                })?;

        Ok(normalize(payload))
    }
}

#[derive(Debug, Deserialize)]
struct BrapiQuoteResponse {
    #[serde(default)]
    results: Vec<BrapiQuoteResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrapiQuoteResult {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    regular_market_change: Option<f64>,
    #[serde(default)]
    regular_market_change_percent: Option<f64>,
    #[serde(default)]
    regular_market_volume: Option<u64>,
}

fn normalize(payload: BrapiQuoteResponse) -> HashMap<String, QuoteRecord> {
    let stamped_at = Utc::now();
    let mut records = HashMap::with_capacity(payload.results.len());

    for result in payload.results {
        if result.symbol.is_empty() {
            continue;
        }
        records.insert(
            result.symbol.clone(),
            QuoteRecord {
                symbol: result.symbol,
                price: to_decimal(result.regular_market_price),
                change: to_decimal(result.regular_market_change),
                change_percent: to_decimal(result.regular_market_change_percent),
                volume: Some(result.regular_market_volume.unwrap_or(0)),
                timestamp: stamped_at,
                source: SOURCE_ID.to_string(),
            },
        );
    }

    records
}

fn to_decimal(value: Option<f64>) -> Decimal {
    value
        .and_then(|v| Decimal::try_from(v).ok())
        .unwrap_or(Decimal::ZERO)
}
