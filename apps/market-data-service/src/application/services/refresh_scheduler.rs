//! Refresh Scheduler
//!
//! One long-lived background task that polls every configured quote source
//! at a fixed interval, merges results into the market data cache, and
//! publishes a snapshot after each cycle with at least one successful
//! source.
//!
//! State machine: STOPPED -> RUNNING -> STOPPED. `start` is a no-op while
//! RUNNING; `stop` is cooperative - the in-flight cycle completes and the
//! loop exits within one interval. The scheduler never terminates on its
//! own: source failures are contained per cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::application::ports::QuoteSourcePort;
use crate::domain::cache::MarketDataCache;
use crate::infrastructure::broadcast::BroadcastHub;

/// A quote source paired with the fixed symbol set it is polled for.
///
/// Symbol sets are configured at construction; callers of the query surface
/// cannot change what is polled.
pub struct ScheduledSource {
    /// The provider adapter.
    pub source: Arc<dyn QuoteSourcePort>,
    /// Symbols requested from this source every cycle.
    pub symbols: Vec<String>,
}

/// Outcome of a start or stop control call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The call transitioned the scheduler.
    Changed,
    /// The scheduler was already in the requested state.
    Unchanged,
}

/// Freshness of a single source, for the status surface.
#[derive(Debug, Clone)]
pub struct SourceFreshness {
    /// Source identifier.
    pub source: String,
    /// Completion time of this source's most recent successful fetch.
    pub last_success: Option<DateTime<Utc>>,
}

/// Scheduler status snapshot for the query surface.
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    /// Whether the scheduler is RUNNING.
    pub running: bool,
    /// Configured refresh interval.
    pub interval: Duration,
    /// Per-source freshness, in configuration order.
    pub sources: Vec<SourceFreshness>,
}

/// Periodic fetch-merge-publish driver.
pub struct RefreshScheduler {
    sources: Vec<ScheduledSource>,
    cache: Arc<MarketDataCache>,
    hub: Arc<BroadcastHub>,
    interval: Duration,
    running: AtomicBool,
    loop_token: Mutex<Option<CancellationToken>>,
    last_success: RwLock<Vec<Option<DateTime<Utc>>>>,
    shutdown: CancellationToken,
}

impl RefreshScheduler {
    /// Create a scheduler in the STOPPED state.
    ///
    /// The loop task is a child of `shutdown`: cancelling it stops a running
    /// scheduler without an explicit `stop` call.
    #[must_use]
    pub fn new(
        sources: Vec<ScheduledSource>,
        cache: Arc<MarketDataCache>,
        hub: Arc<BroadcastHub>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        let last_success = RwLock::new(vec![None; sources.len()]);
        Self {
            sources,
            cache,
            hub,
            interval,
            running: AtomicBool::new(false),
            loop_token: Mutex::new(None),
            last_success,
            shutdown,
        }
    }

    /// Transition to RUNNING and spawn the refresh loop.
    ///
    /// Idempotent: returns [`ControlOutcome::Unchanged`] when already
    /// RUNNING.
    pub fn start(self: &Arc<Self>) -> ControlOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return ControlOutcome::Unchanged;
        }

        let token = self.shutdown.child_token();
        *self.loop_token.lock() = Some(token.clone());

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.run_loop(token).await;
        });

        ControlOutcome::Changed
    }

    /// Transition to STOPPED.
    ///
    /// Cooperative: the in-flight cycle (if any) completes, and the loop
    /// exits within one interval. No network call is aborted.
    pub fn stop(&self) -> ControlOutcome {
        if self
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return ControlOutcome::Unchanged;
        }

        if let Some(token) = self.loop_token.lock().take() {
            token.cancel();
        }
        ControlOutcome::Changed
    }

    /// Whether the scheduler is RUNNING.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Configured refresh interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Status snapshot for the query surface.
    #[must_use]
    pub fn status(&self) -> SchedulerStatus {
        let last_success = self.last_success.read();
        let sources = self
            .sources
            .iter()
            .zip(last_success.iter())
            .map(|(scheduled, last)| SourceFreshness {
                source: scheduled.source.source_id().to_string(),
                last_success: *last,
            })
            .collect();

        SchedulerStatus {
            running: self.is_running(),
            interval: self.interval,
            sources,
        }
    }

    /// Execute one fetch-merge-publish cycle.
    ///
    /// All sources are invoked concurrently with their configured symbol
    /// sets. Each non-empty success merges as one atomic batch. When at
    /// least one source succeeded, the cache last-update timestamp advances
    /// and a snapshot is published; when every source fails, the cycle is
    /// skipped and the scheduler keeps going.
    pub async fn run_cycle(&self) {
        let fetches = self
            .sources
            .iter()
            .map(|scheduled| scheduled.source.fetch(&scheduled.symbols));
        let results = join_all(fetches).await;

        let mut any_success = false;
        for (index, result) in results.into_iter().enumerate() {
            let source_id = self.sources[index].source.source_id();
            match result {
                Ok(records) if !records.is_empty() => {
                    tracing::debug!(
                        source = source_id,
                        count = records.len(),
                        "Merging quote batch"
                    );
                    self.cache.merge(records);
                    self.last_success.write()[index] = Some(Utc::now());
                    any_success = true;
                }
                Ok(_) => {
                    tracing::warn!(source = source_id, "Source returned no records");
                }
                Err(error) => {
                    tracing::warn!(source = source_id, error = %error, "Quote fetch failed");
                }
            }
        }

        if any_success {
            let completed_at = Utc::now();
            self.cache.set_last_update(completed_at);
            let receivers = self.hub.publish(self.cache.snapshot(), completed_at);
            tracing::debug!(
                cached_symbols = self.cache.len(),
                receivers = receivers.unwrap_or(0),
                "Refresh cycle completed"
            );
        } else {
            tracing::warn!("All quote sources failed; skipping merge and publish");
        }
    }

    async fn run_loop(&self, token: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            sources = self.sources.len(),
            "Refresh scheduler started"
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                () = token.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        // Clear state on exit (covers the shutdown-token path; an explicit
        // stop() already flipped the flag) - unless a restart installed a
        // fresh token while this loop was draining its last cycle.
        {
            let mut current = self.loop_token.lock();
            let superseded = current.as_ref().is_some_and(|t| !t.is_cancelled());
            if !superseded {
                current.take();
                self.running.store(false, Ordering::SeqCst);
            }
        }
        tracing::info!("Refresh scheduler stopped");
    }
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("sources", &self.sources.len())
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use super::*;
    use crate::application::ports::QuoteSourceError;
    use crate::domain::quote::QuoteRecord;

    struct StubSource {
        id: &'static str,
        records: HashMap<String, QuoteRecord>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn succeeding(id: &'static str, symbols: &[&str]) -> Self {
            let records = symbols
                .iter()
                .map(|symbol| {
                    (
                        (*symbol).to_string(),
                        QuoteRecord {
                            symbol: (*symbol).to_string(),
                            price: Decimal::new(100, 0),
                            change: Decimal::ZERO,
                            change_percent: Decimal::ZERO,
                            volume: Some(0),
                            timestamp: Utc::now(),
                            source: id.to_string(),
                        },
                    )
                })
                .collect();
            Self {
                id,
                records,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(id: &'static str) -> Self {
            Self {
                id,
                records: HashMap::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuoteSourcePort for StubSource {
        fn source_id(&self) -> &'static str {
            self.id
        }

        async fn fetch(
            &self,
            _symbols: &[String],
        ) -> Result<HashMap<String, QuoteRecord>, QuoteSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(QuoteSourceError::Transport {
                    message: "connection refused".to_string(),
                });
            }
            Ok(self.records.clone())
        }
    }

    fn scheduler_with(
        sources: Vec<ScheduledSource>,
        interval: Duration,
    ) -> (Arc<RefreshScheduler>, Arc<MarketDataCache>, Arc<BroadcastHub>) {
        let cache = Arc::new(MarketDataCache::new());
        let hub = Arc::new(BroadcastHub::new(16));
        let scheduler = Arc::new(RefreshScheduler::new(
            sources,
            Arc::clone(&cache),
            Arc::clone(&hub),
            interval,
            CancellationToken::new(),
        ));
        (scheduler, cache, hub)
    }

    fn scheduled(source: StubSource, symbols: &[&str]) -> ScheduledSource {
        ScheduledSource {
            source: Arc::new(source),
            symbols: symbols.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn cycle_merges_and_publishes_on_success() {
        let (scheduler, cache, hub) = scheduler_with(
            vec![scheduled(
                StubSource::succeeding("stub", &["PETR4"]),
                &["PETR4"],
            )],
            Duration::from_secs(5),
        );
        let mut rx = hub.subscribe();

        scheduler.run_cycle().await;

        assert_eq!(cache.len(), 1);
        assert!(cache.last_update().is_some());

        let update = rx.recv().await.unwrap();
        assert!(update.data.contains_key("PETR4"));
    }

    #[tokio::test]
    async fn cycle_with_all_sources_failing_skips_merge_and_publish() {
        let (scheduler, cache, hub) = scheduler_with(
            vec![
                scheduled(StubSource::failing("a"), &["PETR4"]),
                scheduled(StubSource::failing("b"), &["USD-BRL"]),
            ],
            Duration::from_secs(5),
        );
        let mut rx = hub.subscribe();

        scheduler.run_cycle().await;

        assert!(cache.is_empty());
        assert!(cache.last_update().is_none());
        assert!(matches!(
            rx.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn cycle_with_partial_failure_still_advances_timestamp() {
        let (scheduler, cache, _hub) = scheduler_with(
            vec![
                scheduled(StubSource::succeeding("good", &["PETR4"]), &["PETR4"]),
                scheduled(StubSource::failing("bad"), &["USD-BRL"]),
            ],
            Duration::from_secs(5),
        );

        scheduler.run_cycle().await;

        assert_eq!(cache.len(), 1);
        assert!(cache.last_update().is_some());

        let status = scheduler.status();
        assert!(status.sources[0].last_success.is_some());
        assert!(status.sources[1].last_success.is_none());
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let (scheduler, _cache, _hub) = scheduler_with(
            vec![scheduled(
                StubSource::succeeding("stub", &["PETR4"]),
                &["PETR4"],
            )],
            Duration::from_millis(10),
        );

        assert_eq!(scheduler.start(), ControlOutcome::Changed);
        assert!(scheduler.is_running());
        assert_eq!(scheduler.start(), ControlOutcome::Unchanged);
        assert!(scheduler.is_running());

        scheduler.stop();
    }

    #[tokio::test]
    async fn stop_when_stopped_is_unchanged() {
        let (scheduler, _cache, _hub) = scheduler_with(vec![], Duration::from_millis(10));
        assert_eq!(scheduler.stop(), ControlOutcome::Unchanged);
    }

    #[tokio::test]
    async fn loop_repeats_until_stopped() {
        let source = Arc::new(StubSource::succeeding("stub", &["PETR4"]));
        let counting = Arc::clone(&source);
        let (scheduler, _cache, _hub) = scheduler_with(
            vec![ScheduledSource {
                source,
                symbols: vec!["PETR4".to_string()],
            }],
            Duration::from_millis(10),
        );

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(scheduler.stop(), ControlOutcome::Changed);
        assert!(!scheduler.is_running());

        let calls_at_stop = counting.calls.load(Ordering::SeqCst);
        assert!(calls_at_stop >= 2, "expected repeated cycles, saw {calls_at_stop}");

        // No further cycles once the loop has wound down.
        tokio::time::sleep(Duration::from_millis(60)).await;
        let calls_after = counting.calls.load(Ordering::SeqCst);
        assert!(calls_after <= calls_at_stop + 1);
    }

    #[tokio::test]
    async fn scheduler_is_restartable() {
        let (scheduler, cache, _hub) = scheduler_with(
            vec![scheduled(
                StubSource::succeeding("stub", &["PETR4"]),
                &["PETR4"],
            )],
            Duration::from_millis(10),
        );

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(30)).await;
        scheduler.stop();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(scheduler.start(), ControlOutcome::Changed);
        assert!(scheduler.is_running());
        scheduler.stop();
        let _ = cache;
    }

    #[tokio::test]
    async fn shutdown_token_stops_the_loop() {
        let shutdown = CancellationToken::new();
        let cache = Arc::new(MarketDataCache::new());
        let hub = Arc::new(BroadcastHub::new(16));
        let scheduler = Arc::new(RefreshScheduler::new(
            vec![scheduled(
                StubSource::succeeding("stub", &["PETR4"]),
                &["PETR4"],
            )],
            cache,
            hub,
            Duration::from_millis(10),
            shutdown.clone(),
        ));

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(!scheduler.is_running());
    }
}
