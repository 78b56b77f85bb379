//! Gamma market record normalization.

use crate::models::RawGammaMarket;
use edge_scan_core::normalize::{
    complete_price_legs, extract_underlying, is_active, is_binary, mid_or_side, non_empty,
    parse_resolution_time,
};
use edge_scan_core::{DataShapeError, Market, Platform};
use tracing::debug;

/// Maps one raw Gamma record to a [`Market`].
///
/// # Errors
/// Returns the [`DataShapeError`] describing why the record is unusable.
pub fn try_normalize(record: &serde_json::Value) -> Result<Market, DataShapeError> {
    let raw: RawGammaMarket = serde_json::from_value(record.clone())
        .map_err(|e| DataShapeError::Malformed(e.to_string()))?;

    if !is_binary(raw.market_type.as_deref(), raw.outcome_count()) {
        return Err(DataShapeError::NotBinary);
    }

    let resolution_time =
        parse_resolution_time(raw.end_date.as_deref().or(raw.end_date_iso.as_deref()))?;

    let yes = raw
        .outcome_price("yes", 0)
        .or_else(|| mid_or_side(raw.best_bid, raw.best_ask))
        .or(raw.last_trade_price);
    let no = raw.outcome_price("no", 1);
    let (yes_price, no_price) = complete_price_legs(yes, no)?;

    let id = raw
        .market_id()
        .map(str::to_string)
        .ok_or_else(|| DataShapeError::Malformed("missing id".to_string()))?;
    let question = non_empty(raw.question.clone())
        .ok_or_else(|| DataShapeError::Malformed(format!("{id}: missing question")))?;

    Ok(Market {
        platform: Platform::Polymarket,
        underlying_entity: extract_underlying(&question),
        is_active: is_active(raw.is_closed(), raw.active, None),
        id,
        question,
        resolution_time,
        yes_price,
        no_price,
        settlement_description: non_empty(raw.description),
        is_binary: true,
    })
}

/// Like [`try_normalize`], but logs and drops unusable records.
#[must_use]
pub fn normalize(record: &serde_json::Value) -> Option<Market> {
    match try_normalize(record) {
        Ok(market) => Some(market),
        Err(err) => {
            let id = record
                .get("id")
                .or_else(|| record.get("conditionId"))
                .map(ToString::to_string)
                .unwrap_or_else(|| "<unknown>".to_string());
            debug!(venue = "polymarket", id = %id, reason = %err, "Skipping record");
            None
        }
    }
}
