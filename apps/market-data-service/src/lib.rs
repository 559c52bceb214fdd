#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Market Data Service
//!
//! Polls public stock and currency quote APIs on a fixed interval, merges
//! normalized records into a shared in-memory cache, broadcasts snapshots
//! to connected listeners, and serves an HTTP query/control surface.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Core market data types and state
//!   - `quote`: The normalized `QuoteRecord` shape
//!   - `cache`: Shared symbol-to-record cache with batch-atomic merges
//!
//! - **Application**: Orchestration and port definitions
//!   - `ports`: Quote source interface every provider adapter implements
//!   - `services`: The refresh scheduler driving fetch-merge-publish cycles
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `sources`: BRAPI (stocks) and AwesomeAPI (currency) adapters
//!   - `broadcast`: Channel-based snapshot distribution
//!   - `http`: REST query surface and WebSocket listener endpoint
//!   - `config`: Environment-driven configuration
//!
//! # Data Flow
//!
//! ```text
//! Stock API ----+                                       +--> /ws listeners
//!               +--> Refresh --> Market Data --> Broadcast
//! Currency API-+    Scheduler       Cache          Hub
//!                                     ^
//!                                     +-- HTTP query surface
//!                                         (/quote, /all, /status)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core market data types with no external integrations.
pub mod domain;

/// Application layer - Scheduler and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::cache::MarketDataCache;
pub use domain::quote::QuoteRecord;

// Ports
pub use application::ports::{QuoteSourceError, QuoteSourcePort};

// Scheduler
pub use application::services::{
    ControlOutcome, RefreshScheduler, ScheduledSource, SchedulerStatus, SourceFreshness,
};

// Broadcast hub (also for integration tests)
pub use infrastructure::broadcast::{BroadcastHub, MARKET_UPDATE_EVENT, MarketUpdate};

// Configuration
pub use infrastructure::config::{ConfigError, ServiceConfig};

// Query surface
pub use infrastructure::http::{ApiServer, AppState, ServerError, create_router};

// Provider adapters
pub use infrastructure::sources::{AwesomeQuoteSource, BrapiQuoteSource};
