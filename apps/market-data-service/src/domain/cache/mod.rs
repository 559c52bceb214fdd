//! Market Data Cache
//!
//! Process-wide mapping from symbol to the latest normalized record, plus
//! the completion time of the most recent successful refresh cycle. The
//! refresh scheduler is the sole writer; request handlers and broadcast
//! listeners read concurrently.
//!
//! A merge takes the write lock once for the whole batch, so readers never
//! observe a partially applied batch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::quote::QuoteRecord;

/// Shared in-memory cache of the latest quote per symbol.
///
/// Created once at process start, empty. Lives for the process lifetime.
#[derive(Debug, Default)]
pub struct MarketDataCache {
    records: RwLock<HashMap<String, QuoteRecord>>,
    last_update: RwLock<Option<DateTime<Utc>>>,
}

impl MarketDataCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of records, last-write-wins per symbol.
    ///
    /// Symbols absent from the batch are left untouched. No conflict
    /// detection: a record in the batch unconditionally replaces any cached
    /// record for the same symbol.
    pub fn merge(&self, records: HashMap<String, QuoteRecord>) {
        if records.is_empty() {
            return;
        }
        self.records.write().extend(records);
    }

    /// Latest record for a symbol, if cached.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<QuoteRecord> {
        self.records.read().get(symbol).cloned()
    }

    /// Point-in-time copy of the full mapping.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, QuoteRecord> {
        self.records.read().clone()
    }

    /// Currently cached symbols, sorted for stable output.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.records.read().keys().cloned().collect();
        symbols.sort_unstable();
        symbols
    }

    /// Number of cached symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check whether the cache holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Record the completion time of a successful refresh cycle.
    pub fn set_last_update(&self, timestamp: DateTime<Utc>) {
        *self.last_update.write() = Some(timestamp);
    }

    /// Completion time of the most recent successful cycle, if any.
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.read()
    }
}
