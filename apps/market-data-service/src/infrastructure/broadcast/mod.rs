//! Broadcast Channel
//!
//! Fan-out of cache snapshots to connected listeners using a tokio
//! broadcast channel. Delivery is best-effort: a receiver that lags past
//! the channel capacity or disconnects simply misses publications, and a
//! newly subscribed receiver only observes future ones. There is no
//! durable queue and no replay.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::domain::quote::QuoteRecord;

/// Event name carried by listener-facing publications.
pub const MARKET_UPDATE_EVENT: &str = "market_update";

/// Payload published after each successful refresh cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketUpdate {
    /// Full cache snapshot at publication time.
    pub data: HashMap<String, QuoteRecord>,
    /// Completion time of the refresh cycle.
    pub timestamp: DateTime<Utc>,
}

/// Hub for market update broadcasts.
///
/// Cheap to share behind an `Arc`; every subscriber gets an independent
/// receiver cursor.
#[derive(Debug)]
pub struct BroadcastHub {
    market_updates_tx: broadcast::Sender<MarketUpdate>,
}

impl BroadcastHub {
    /// Create a hub whose channel buffers up to `capacity` publications
    /// per receiver before lagging ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            market_updates_tx: broadcast::channel(capacity).0,
        }
    }

    /// Publish a snapshot to all current listeners.
    ///
    /// Returns the number of receivers the publication reached, or `None`
    /// when nobody is listening.
    pub fn publish(
        &self,
        data: HashMap<String, QuoteRecord>,
        timestamp: DateTime<Utc>,
    ) -> Option<usize> {
        self.market_updates_tx
            .send(MarketUpdate { data, timestamp })
            .ok()
    }

    /// Get a new receiver for future market updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MarketUpdate> {
        self.market_updates_tx.subscribe()
    }

    /// Number of currently connected receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.market_updates_tx.receiver_count()
    }
}
