//! AwesomeAPI Currency Quote Source
//!
//! Batch adapter for an AwesomeAPI-compatible currency quote API:
//! `GET {base}/last/{pairs}` with comma-joined hyphenated pair codes
//! (`USD-BRL`), answering a map keyed by the unhyphenated code
//! (`{"USDBRL": {"bid": "5.12", "varBid": "0.01", "pctChange": "0.2"}}`).
//! Records are re-keyed to the requested pair code so cache lookups match
//! the configured identifiers. Currency quotes carry no volume.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::ports::{QuoteSourceError, QuoteSourcePort};
use crate::domain::quote::QuoteRecord;

const SOURCE_ID: &str = "awesomeapi";

/// Currency pair quote adapter.
#[derive(Debug)]
pub struct AwesomeQuoteSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl AwesomeQuoteSource {
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
impl QuoteSourcePort for AwesomeQuoteSource {
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

        let url = format!("{}/last/{}", self.base_url, symbols.join(","));
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

        let payload: HashMap<String, AwesomeQuote> =
            response
                .json()
                .await
                .map_err(|e| QuoteSourceError::MalformedPayload {
                    message: e.to_string(),
                })?;

        Ok(normalize(symbols, &payload))
    }
}

#[derive(Debug, Deserialize)]
struct AwesomeQuote {
    #[serde(default)]
    bid: Option<String>,
    #[serde(default, rename = "varBid")]
    var_bid: Option<String>,
    #[serde(default, rename = "pctChange")]
    pct_change: Option<String>,
}

fn normalize(
    pairs: &[String],
    payload: &HashMap<String, AwesomeQuote>,
) -> HashMap<String, QuoteRecord> {
    let stamped_at = Utc::now();
    let mut records = HashMap::with_capacity(pairs.len());

    for pair in pairs {
        if pair.is_empty() {
            continue;
        }
        let response_key = pair.replace('-', "");
        let Some(quote) = payload.get(&response_key).or_else(|| payload.get(pair)) else {
            continue;
        };
        records.insert(
            pair.clone(),
            QuoteRecord {
                symbol: pair.clone(),
                price: parse_decimal(quote.bid.as_deref()),
                change: parse_decimal(quote.var_bid.as_deref()),
                change_percent: parse_decimal(quote.pct_change.as_deref()),
                volume: None,
                timestamp: stamped_at,
                source: SOURCE_ID.to_string(),
            },
        );
    }

    records
}

fn parse_decimal(value: Option<&str>) -> Decimal {
    value
        .and_then(|text| text.parse::<Decimal>().ok())
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn pairs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| (*c).to_string()).collect()
    }

    fn payload(entries: &str) -> HashMap<String, AwesomeQuote> {
        serde_json::from_str(entries).unwrap()
    }

    #[test]
    fn records_are_keyed_by_requested_pair() {
        let response = payload(
            r#"{"USDBRL": {"bid": "5.12", "varBid": "0.01", "pctChange": "0.2"}}"#,
        );

        let records = normalize(&pairs(&["USD-BRL"]), &response);
        let record = &records["USD-BRL"];

        assert_eq!(record.symbol, "USD-BRL");
        assert_eq!(record.price, Decimal::from_str("5.12").unwrap());
        assert_eq!(record.change, Decimal::from_str("0.01").unwrap());
        assert_eq!(record.change_percent, Decimal::from_str("0.2").unwrap());
        assert_eq!(record.source, "awesomeapi");
    }

    #[test]
    fn currency_records_carry_no_volume() {
        let response = payload(r#"{"USDBRL": {"bid": "5.12"}}"#);
        let records = normalize(&pairs(&["USD-BRL"]), &response);
        assert_eq!(records["USD-BRL"].volume, None);
    }

    #[test]
    fn pair_missing_from_response_is_omitted() {
        let response = payload(r#"{"USDBRL": {"bid": "5.12"}}"#);
        let records = normalize(&pairs(&["USD-BRL", "EUR-BRL"]), &response);

        assert_eq!(records.len(), 1);
        assert!(!records.contains_key("EUR-BRL"));
    }

    #[test]
    fn malformed_numerics_default_to_zero() {
        let response = payload(r#"{"BTCBRL": {"bid": "not-a-number"}}"#);
        let record = &normalize(&pairs(&["BTC-BRL"]), &response)["BTC-BRL"];

        assert_eq!(record.price, Decimal::ZERO);
        assert_eq!(record.change, Decimal::ZERO);
    }

    #[test]
    fn response_keyed_by_requested_code_also_matches() {
        let response = payload(r#"{"USD-BRL": {"bid": "5.12"}}"#);
        let records = normalize(&pairs(&["USD-BRL"]), &response);
        assert_eq!(records.len(), 1);
    }
}
