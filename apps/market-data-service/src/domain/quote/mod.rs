//! Normalized Quote Types
//!
//! Every quote source adapter produces records in this shape, regardless of
//! the upstream provider's field names. Numeric fields the provider omits or
//! mangles are normalized to zero rather than rejected.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One normalized quotation.
///
/// `timestamp` is stamped locally at normalization time; whatever timestamp
/// the provider reports is discarded. Because of that, successive records for
/// the same symbol carry non-decreasing timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Symbol identifier, unique within a refresh cycle. Never empty.
    pub symbol: String,
    /// Current price.
    pub price: Decimal,
    /// Delta since the prior reference, as reported by the provider.
    pub change: Decimal,
    /// Percentage delta, as reported by the provider.
    #[serde(rename = "changePercent")]
    pub change_percent: Decimal,
    /// Trade volume. Absent for currency pairs; zero-defaulted for stocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    /// Capture time, stamped at normalization.
    pub timestamp: DateTime<Utc>,
    /// Identifier of the adapter that produced this record. Never empty.
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(volume: Option<u64>) -> QuoteRecord {
        QuoteRecord {
            symbol: "PETR4".to_string(),
            price: Decimal::new(3210, 2),
            change: Decimal::new(15, 2),
            change_percent: Decimal::new(47, 2),
            volume,
            timestamp: Utc::now(),
            source: "brapi".to_string(),
        }
    }

    #[test]
    fn serializes_change_percent_in_camel_case() {
        let json = serde_json::to_string(&sample_record(Some(1000))).unwrap();
        assert!(json.contains(r#""changePercent":"#));
        assert!(!json.contains("change_percent"));
    }

    #[test]
    fn omits_volume_when_absent() {
        let json = serde_json::to_string(&sample_record(None)).unwrap();
        assert!(!json.contains("volume"));
    }

    #[test]
    fn round_trips_through_json() {
        let record = sample_record(Some(42));
        let json = serde_json::to_string(&record).unwrap();
        let parsed: QuoteRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
