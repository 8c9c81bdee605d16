//! Periodic snapshot refresh for long-running views

use crate::core::error::QuoteFetchError;
use crate::core::quote::Snapshot;
use crate::core::service::RatesService;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, warn};

const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(1);

/// What a view should show after the latest poll.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// Last snapshot that was fetched successfully.
    pub snapshot: Option<Arc<Snapshot>>,
    /// Error of the latest poll, cleared by the next success.
    pub error: Option<QuoteFetchError>,
    pub polled_at: Option<DateTime<Utc>>,
}

impl PollState {
    /// Showing an old snapshot because the latest poll failed.
    pub fn is_stale(&self) -> bool {
        self.snapshot.is_some() && self.error.is_some()
    }
}

pub struct Poller {
    service: Arc<RatesService>,
    refetch_interval: Duration,
    state: PollState,
}

impl Poller {
    pub fn new(service: Arc<RatesService>, refetch_interval: Duration) -> Self {
        Self {
            service,
            refetch_interval: refetch_interval.max(MIN_REFETCH_INTERVAL),
            state: PollState::default(),
        }
    }

    /// Timer driving the refresh loop. The first tick fires immediately.
    pub fn ticker(&self) -> Interval {
        let mut interval = tokio::time::interval(self.refetch_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Refreshes the snapshot. `force` skips the freshness window, as a
    /// manual refresh does.
    pub async fn poll(&mut self, force: bool) -> &PollState {
        match self.service.snapshot(force).await {
            Ok(snapshot) => {
                debug!(last_updated = %snapshot.last_updated, "Poll succeeded");
                self.state.snapshot = Some(snapshot);
                self.state.error = None;
            }
            Err(err) => {
                warn!(error = %err, stale = self.state.snapshot.is_some(), "Poll failed");
                self.state.error = Some(err);
            }
        }
        self.state.polled_at = Some(Utc::now());
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::service::test_support::{FakeMarket, service};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_failure_keeps_last_snapshot() {
        let market = Arc::new(FakeMarket::default());
        let mut poller = Poller::new(Arc::new(service(&market)), Duration::from_secs(60));

        let state = poller.poll(false).await;
        assert!(state.snapshot.is_some());
        assert!(!state.is_stale());

        market.set_down(true);
        let state = poller.poll(true).await;
        assert!(state.is_stale());
        assert_eq!(state.snapshot.as_ref().unwrap().dollars.len(), 2);

        market.set_down(false);
        let state = poller.poll(true).await;
        assert!(state.error.is_none());
        assert_eq!(market.dollar_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_first_failure_has_nothing_to_show() {
        let market = Arc::new(FakeMarket::default());
        market.set_down(true);
        let mut poller = Poller::new(Arc::new(service(&market)), Duration::from_secs(60));

        let state = poller.poll(false).await;
        assert!(state.snapshot.is_none());
        assert!(state.error.as_ref().unwrap().is_required());
        assert!(!state.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let market = Arc::new(FakeMarket::default());
        let poller = Poller::new(Arc::new(service(&market)), Duration::ZERO);
        let mut ticker = poller.ticker();

        ticker.tick().await;
        let start = tokio::time::Instant::now();
        ticker.tick().await;
        assert_eq!(start.elapsed(), MIN_REFETCH_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_follows_refetch_interval() {
        let market = Arc::new(FakeMarket::default());
        let mut poller = Poller::new(Arc::new(service(&market)), Duration::from_secs(60));
        let mut ticker = poller.ticker();

        ticker.tick().await;
        poller.poll(false).await;
        let start = tokio::time::Instant::now();
        ticker.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(60));

        // Past the 30s freshness window, so the tick refetches
        poller.poll(false).await;
        assert_eq!(market.dollar_calls.load(Ordering::SeqCst), 2);
    }
}
