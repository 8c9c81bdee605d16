//! Combines the dollar list, the real and the euro into one snapshot

use crate::core::error::QuoteFetchError;
use crate::core::quote::{BLUE, CurrencyQuote, OFICIAL, QuoteProvider, REAL_BLUE, Snapshot};
use chrono::Utc;
use tracing::{debug, instrument, warn};

pub const REAL_CODE: &str = "brl";
pub const EURO_CODE: &str = "eur";

/// Fetches the three upstream resources concurrently and builds a snapshot.
///
/// Only the dollar list is required. A failed real or euro fetch leaves the
/// matching field empty instead of failing the whole snapshot.
#[instrument(name = "FetchSnapshot", skip(provider))]
pub async fn fetch_snapshot(provider: &dyn QuoteProvider) -> Result<Snapshot, QuoteFetchError> {
    let (dollars, real, euro) = futures::join!(
        provider.fetch_dollars(),
        provider.fetch_quote(REAL_CODE),
        provider.fetch_quote(EURO_CODE),
    );

    let dollars = blue_first(dollars.map_err(|e| QuoteFetchError::required("dollar", e))?);

    let real = real
        .map_err(|e| log_optional(QuoteFetchError::optional("real", e)))
        .ok();
    let euro = euro
        .map_err(|e| log_optional(QuoteFetchError::optional("euro", e)))
        .ok();

    let real_blue = real.as_ref().and_then(|r| derive_real_blue(r, &dollars));
    let last_updated = dollars
        .first()
        .and_then(|q| q.updated_at)
        .unwrap_or_else(Utc::now);

    debug!(
        dollars = dollars.len(),
        real_blue = real_blue.is_some(),
        euro = euro.is_some(),
        "Built snapshot"
    );

    Ok(Snapshot {
        dollars,
        real_blue,
        euro,
        last_updated,
    })
}

fn log_optional(err: QuoteFetchError) -> QuoteFetchError {
    warn!(error = %err, cause = ?std::error::Error::source(&err), "Degrading snapshot");
    err
}

/// Moves the entry named "Blue" to the front, keeping everything else in order.
pub fn blue_first(mut quotes: Vec<CurrencyQuote>) -> Vec<CurrencyQuote> {
    quotes.sort_by_key(|q| q.name != BLUE);
    quotes
}

/// Real price scaled by the blue-to-official dollar ratio.
///
/// The upstream has no bid/ask for this pair, so the single rate is used for
/// both buy and sell.
pub fn derive_real_blue(real: &CurrencyQuote, dollars: &[CurrencyQuote]) -> Option<CurrencyQuote> {
    let blue = dollars.iter().find(|q| q.name == BLUE)?;
    let oficial = dollars.iter().find(|q| q.name == OFICIAL)?;

    let rate = real
        .buy
        .checked_mul(blue.buy)
        .and_then(|v| v.checked_div(oficial.buy));
    let Some(rate) = rate else {
        warn!(
            real = %real.buy,
            blue = %blue.buy,
            oficial = %oficial.buy,
            "Cannot derive Real Blue rate"
        );
        return None;
    };

    Some(CurrencyQuote {
        name: REAL_BLUE.to_string(),
        buy: rate,
        sell: rate,
        ..real.clone()
    })
}
