//! Market Data Service Binary
//!
//! Starts the refresh scheduler and the query surface HTTP server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin market-data-service
//! ```
//!
//! # Environment Variables (all optional)
//!
//! - `MARKET_DATA_HTTP_PORT`: Query surface port (default: 8080)
//! - `MARKET_DATA_UPDATE_INTERVAL_SECS`: Refresh interval (default: 5)
//! - `MARKET_DATA_STOCK_SYMBOLS`: Comma-separated stock tickers
//! - `MARKET_DATA_CURRENCY_PAIRS`: Comma-separated currency pairs
//! - `MARKET_DATA_BRAPI_BASE_URL`: Stock quote API base URL
//! - `MARKET_DATA_AWESOME_BASE_URL`: Currency quote API base URL
//! - `MARKET_DATA_REQUEST_TIMEOUT_SECS`: Provider request timeout (default: 10)
//! - `MARKET_DATA_BROADCAST_CAPACITY`: Broadcast channel capacity (default: 256)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use market_data_service::{
    ApiServer, AppState, AwesomeQuoteSource, BrapiQuoteSource, BroadcastHub, MarketDataCache,
    QuoteSourcePort, RefreshScheduler, ScheduledSource, ServiceConfig,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    tracing::info!("Starting market data service");

    let config = ServiceConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let cache = Arc::new(MarketDataCache::new());
    let hub = Arc::new(BroadcastHub::new(config.broadcast_capacity));

    let brapi = BrapiQuoteSource::new(config.brapi_base_url.clone(), config.request_timeout)?;
    let awesome = AwesomeQuoteSource::new(config.awesome_base_url.clone(), config.request_timeout)?;

    let sources = vec![
        ScheduledSource {
            source: Arc::new(brapi) as Arc<dyn QuoteSourcePort>,
            symbols: config.stock_symbols.clone(),
        },
        ScheduledSource {
            source: Arc::new(awesome) as Arc<dyn QuoteSourcePort>,
            symbols: config.currency_pairs.clone(),
        },
    ];

    let scheduler = Arc::new(RefreshScheduler::new(
        sources,
        Arc::clone(&cache),
        Arc::clone(&hub),
        config.update_interval,
        shutdown_token.clone(),
    ));

    // Background updates run from process start; /stop pauses them.
    scheduler.start();

    let state = AppState {
        cache,
        scheduler,
        hub,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let api_server = ApiServer::new(config.http_port, state, shutdown_token.clone());

    tokio::spawn(async move {
        if let Err(e) = api_server.run().await {
            tracing::error!(error = %e, "API server error");
        }
    });

    tracing::info!("Market data service ready");

    await_shutdown(shutdown_token).await;

    tracing::info!("Market data service stopped");
    Ok(())
}

/// Load .env file from the current directory, if present.
fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Initialize the tracing subscriber, honoring `RUST_LOG`.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Log the parsed configuration.
fn log_config(config: &ServiceConfig) {
    tracing::info!(
        http_port = config.http_port,
        interval_secs = config.update_interval.as_secs(),
        stock_symbols = config.stock_symbols.len(),
        currency_pairs = config.currency_pairs.len(),
        "Configuration loaded"
    );
    tracing::debug!(
        brapi_base_url = %config.brapi_base_url,
        awesome_base_url = %config.awesome_base_url,
        "Quote provider endpoints"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT), then cancel the token.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
