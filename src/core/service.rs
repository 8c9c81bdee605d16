//! Cached access to quotes and history
//!
//! Every read goes through a keyed [`QueryCache`], so repeated commands inside
//! the freshness window and concurrent readers share one upstream request.

use crate::core::aggregate::fetch_snapshot;
use crate::core::error::{FetchError, QuoteFetchError};
use crate::core::history::{HOUSES, HistoricalPoint, HistoryProvider, HistorySeries, HistoryWindow};
use crate::core::query::{QueryCache, QueryOptions};
use crate::core::quote::{CurrencyQuote, QuoteProvider, Snapshot};
use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::instrument;

const SNAPSHOT_KEY: &str = "currencies";

pub struct RatesService {
    quotes: Arc<dyn QuoteProvider>,
    history: Arc<dyn HistoryProvider>,
    snapshot_options: QueryOptions,
    history_options: QueryOptions,
    snapshots: QueryCache<Snapshot, QuoteFetchError>,
    series: QueryCache<Vec<HistoricalPoint>, FetchError>,
    singles: QueryCache<CurrencyQuote, FetchError>,
}

impl RatesService {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        history: Arc<dyn HistoryProvider>,
        snapshot_options: QueryOptions,
        history_options: QueryOptions,
    ) -> Self {
        Self {
            quotes,
            history,
            snapshot_options,
            history_options,
            snapshots: QueryCache::new(),
            series: QueryCache::new(),
            singles: QueryCache::new(),
        }
    }

    #[instrument(name = "Snapshot", skip(self))]
    pub async fn snapshot(&self, force: bool) -> Result<Arc<Snapshot>, QuoteFetchError> {
        let provider = self.quotes.as_ref();
        self.snapshots
            .fetch(SNAPSHOT_KEY, &self.snapshot_options, force, || {
                fetch_snapshot(provider)
            })
            .await
    }

    /// A single `cotizaciones/{code}` quote, cached like the snapshot.
    #[instrument(name = "Quote", skip(self))]
    pub async fn quote(&self, code: &str, force: bool) -> Result<Arc<CurrencyQuote>> {
        let code = code.to_lowercase();
        let key = format!("quote/{code}");
        let provider = self.quotes.as_ref();
        let quote = self
            .singles
            .fetch(&key, &self.snapshot_options, force, || {
                provider.fetch_quote(&code)
            })
            .await?;
        Ok(quote)
    }

    /// History for `house`, sliced to `window` as of today.
    pub async fn history(
        &self,
        house: &str,
        window: HistoryWindow,
        force: bool,
    ) -> Result<HistorySeries> {
        self.history_as_of(house, window, force, Local::now().date_naive())
            .await
    }

    #[instrument(name = "History", skip(self))]
    pub async fn history_as_of(
        &self,
        house: &str,
        window: HistoryWindow,
        force: bool,
        today: NaiveDate,
    ) -> Result<HistorySeries> {
        let house = house.to_lowercase();
        if !HOUSES.contains(&house.as_str()) {
            bail!(
                "Unknown house '{}', expected one of: {}",
                house,
                HOUSES.join(", ")
            );
        }

        let key = format!("historical/{house}");
        let provider = self.history.as_ref();
        let points = self
            .series
            .fetch(&key, &self.history_options, force, || {
                provider.fetch_history(&house)
            })
            .await?;

        Ok(HistorySeries {
            points: window.slice(&points, today).to_vec(),
            house,
            window,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{FakeMarket, service};
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_is_cached_within_stale_time() {
        let market = Arc::new(FakeMarket::default());
        let service = service(&market);

        let first = service.snapshot(false).await.unwrap();
        let second = service.snapshot(false).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.dollars[0].name, "Blue");
        assert_eq!(first.real_blue.as_ref().unwrap().sell, dec!(250));
        assert_eq!(market.dollar_calls.load(Ordering::SeqCst), 1);

        service.snapshot(true).await.unwrap();
        assert_eq!(market.dollar_calls.load(Ordering::SeqCst), 2);

        tokio::time::advance(Duration::from_secs(31)).await;
        service.snapshot(false).await.unwrap();
        assert_eq!(market.dollar_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_snapshot_failure_is_required() {
        let market = Arc::new(FakeMarket::default());
        market.set_down(true);
        let err = service(&market).snapshot(false).await.unwrap_err();
        assert!(err.is_required());
    }

    #[tokio::test]
    async fn test_history_is_cached_per_house_and_sliced() {
        let market = Arc::new(FakeMarket::default());
        let service = service(&market);
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

        let month = service
            .history_as_of("Blue", HistoryWindow::ThirtyDays, false, today)
            .await
            .unwrap();
        let all = service
            .history_as_of("blue", HistoryWindow::All, false, today)
            .await
            .unwrap();
        assert_eq!(month.house, "blue");
        assert_eq!(month.points.len(), 30);
        assert_eq!(all.points.len(), 60);
        assert_eq!(month.last(), all.last());
        assert_eq!(market.history_calls.load(Ordering::SeqCst), 1);

        service
            .history_as_of("oficial", HistoryWindow::All, false, today)
            .await
            .unwrap();
        assert_eq!(market.history_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_history_rejects_unknown_house() {
        let market = Arc::new(FakeMarket::default());
        let result = service(&market)
            .history("peso", HistoryWindow::All, false)
            .await;
        assert!(result.unwrap_err().to_string().contains("Unknown house"));
        assert_eq!(market.history_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_quote() {
        let market = Arc::new(FakeMarket::default());
        let quote = service(&market).quote("CLP", false).await.unwrap();
        assert_eq!(quote.currency_code, "CLP");
    }
}
