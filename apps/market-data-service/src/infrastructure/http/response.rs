//! HTTP response DTOs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::quote::QuoteRecord;

/// Response for specific symbol lookups.
///
/// Requested symbols absent from the cache are silently omitted from
/// `data`; that is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    /// Always true; unknown symbols are not an error.
    pub success: bool,
    /// Cached records for the requested symbols.
    pub data: HashMap<String, QuoteRecord>,
    /// Completion time of the most recent successful refresh cycle.
    pub timestamp: Option<DateTime<Utc>>,
    /// Whether the data was served from the cache (always true).
    pub cached: bool,
}

/// Response for the full cache dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllDataResponse {
    /// Always true.
    pub success: bool,
    /// The full cache snapshot.
    pub data: HashMap<String, QuoteRecord>,
    /// Completion time of the most recent successful refresh cycle.
    pub timestamp: Option<DateTime<Utc>>,
    /// Number of cached symbols.
    pub count: usize,
}

/// Response for the scheduler status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always true.
    pub success: bool,
    /// Whether the refresh scheduler is running.
    pub running: bool,
    /// Completion time of the most recent successful refresh cycle.
    pub last_update: Option<DateTime<Utc>>,
    /// Currently cached symbols.
    pub cached_symbols: Vec<String>,
    /// Configured refresh interval in seconds.
    pub update_interval: u64,
    /// Per-source freshness.
    pub sources: Vec<SourceStatusResponse>,
}

/// Freshness of one quote source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStatusResponse {
    /// Source identifier.
    pub source: String,
    /// Completion time of this source's most recent successful fetch.
    pub last_success: Option<DateTime<Utc>>,
}

/// Response for the start/stop controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlResponse {
    /// Always true; the controls are idempotent.
    pub success: bool,
    /// What the call did, or why it did nothing.
    pub message: String,
    /// Resulting scheduler state.
    pub running: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_response_serializes_null_timestamp() {
        let response = QuoteResponse {
            success: true,
            data: HashMap::new(),
            timestamp: None,
            cached: true,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""timestamp":null"#));
        assert!(json.contains(r#""cached":true"#));
    }

    #[test]
    fn status_response_round_trips() {
        let response = StatusResponse {
            success: true,
            running: true,
            last_update: Some(Utc::now()),
            cached_symbols: vec!["PETR4".to_string()],
            update_interval: 5,
            sources: vec![SourceStatusResponse {
                source: "brapi".to_string(),
                last_success: None,
            }],
        };

        let json = serde_json::to_string(&response).unwrap();
        let parsed: StatusResponse = serde_json::from_str(&json).unwrap();
        assert!(parsed.running);
        assert_eq!(parsed.update_interval, 5);
        assert_eq!(parsed.sources[0].source, "brapi");
    }
}
