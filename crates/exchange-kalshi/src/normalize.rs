//! Kalshi market record normalization.
//!
//! Kalshi quotes prices in whole cents, so every leg is divided by 100 before
//! the shared range check. Yes/no legs come from the midpoint of each side's
//! bid/ask. A zero bid means the side has no bids and is ignored.

use edge_scan_core::normalize::{
    complete_price_legs, extract_underlying, is_active, is_binary, mid_or_side, non_empty,
    parse_resolution_time,
};
use edge_scan_core::{DataShapeError, Market, Platform};
use serde::Deserialize;
use tracing::debug;

/// Statuses after which a Kalshi market no longer trades.
const CLOSED_STATUSES: [&str; 4] = ["closed", "settled", "finalized", "determined"];

/// Raw market record from `GET /markets`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawKalshiMarket {
    pub ticker: String,
    pub event_ticker: Option<String>,
    pub market_type: Option<String>,
    pub title: Option<String>,
    pub question: Option<String>,
    pub subtitle: Option<String>,
    pub status: Option<String>,
    pub yes_bid: Option<f64>,
    pub yes_ask: Option<f64>,
    pub no_bid: Option<f64>,
    pub no_ask: Option<f64>,
    pub last_price: Option<f64>,
    pub close_time: Option<String>,
    pub expiration_time: Option<String>,
    pub rules_primary: Option<String>,
    pub result: Option<String>,
}

impl RawKalshiMarket {
    fn is_closed(&self) -> bool {
        let closed_status = self
            .status
            .as_deref()
            .is_some_and(|s| CLOSED_STATUSES.iter().any(|c| c.eq_ignore_ascii_case(s.trim())));
        let resolved = self.result.as_deref().is_some_and(|r| !r.trim().is_empty());
        closed_status || resolved
    }

    fn question_text(&self) -> Option<String> {
        non_empty(self.title.clone())
            .or_else(|| non_empty(self.question.clone()))
            .or_else(|| non_empty(self.subtitle.clone()))
    }
}

/// Cents per unit of probability.
const CENTS_PER_UNIT: f64 = 100.0;

/// Midpoint of one side's cent quotes, as a probability.
fn cents_leg(bid: Option<f64>, ask: Option<f64>) -> Option<f64> {
    let bid = bid.filter(|b| *b > 0.0);
    mid_or_side(bid, ask).map(|cents| cents / CENTS_PER_UNIT)
}

/// Maps one raw Kalshi record to a [`Market`].
///
/// # Errors
/// Returns the [`DataShapeError`] describing why the record is unusable.
pub fn try_normalize(record: &serde_json::Value) -> Result<Market, DataShapeError> {
    let raw: RawKalshiMarket = serde_json::from_value(record.clone())
        .map_err(|e| DataShapeError::Malformed(e.to_string()))?;

    // Kalshi contracts always carry a yes and a no leg; only an explicit
    // non-binary market_type marks a different shape.
    let outcome_count = raw.market_type.is_none().then_some(2);
    if !is_binary(raw.market_type.as_deref(), outcome_count) {
        return Err(DataShapeError::NotBinary);
    }

    let resolution_time = parse_resolution_time(
        raw.close_time
            .as_deref()
            .or(raw.expiration_time.as_deref()),
    )?;

    let quotes = [raw.yes_bid, raw.yes_ask, raw.no_bid, raw.no_ask, raw.last_price];
    if let Some(cents) = quotes
        .into_iter()
        .flatten()
        .find(|c| !(0.0..=CENTS_PER_UNIT).contains(c))
    {
        return Err(DataShapeError::PriceOutOfRange(cents));
    }

    let last = raw
        .last_price
        .filter(|p| *p > 0.0)
        .map(|cents| cents / CENTS_PER_UNIT);
    let yes = cents_leg(raw.yes_bid, raw.yes_ask).or(last);
    let no = cents_leg(raw.no_bid, raw.no_ask);
    let (yes_price, no_price) = complete_price_legs(yes, no)?;

    let question = raw
        .question_text()
        .ok_or_else(|| DataShapeError::Malformed(format!("{}: missing title", raw.ticker)))?;

    Ok(Market {
        platform: Platform::Kalshi,
        underlying_entity: extract_underlying(&question),
        is_active: is_active(raw.is_closed(), None, raw.status.as_deref()),
        id: raw.ticker,
        question,
        resolution_time,
        yes_price,
        no_price,
        settlement_description: non_empty(raw.rules_primary),
        is_binary: true,
    })
}

/// Like [`try_normalize`], but logs and drops unusable records.
#[must_use]
pub fn normalize(record: &serde_json::Value) -> Option<Market> {
    match try_normalize(record) {
        Ok(market) => Some(market),
        Err(err) => {
            let id = record.get("ticker").and_then(|v| v.as_str()).unwrap_or("<unknown>");
            debug!(venue = "kalshi", id, reason = %err, "Skipping record");
            None
        }
    }
}
