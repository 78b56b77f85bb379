//! Deterministic, price-blind candidate pair generation.
//!
//! Cross-joins eligible markets from both venues and keeps pairs whose
//! resolution times are close enough and whose declared underlying entities
//! (when both have one) agree.

use chrono::Duration;
use edge_scan_core::{Market, MarketPair};
use tracing::debug;

/// Returns true if two markets may describe the same event.
///
/// Prices are never consulted.
#[must_use]
pub fn is_candidate(a: &Market, b: &Market, max_resolution_delta: Duration) -> bool {
    if !a.is_eligible() || !b.is_eligible() {
        return false;
    }
    if (a.resolution_time - b.resolution_time).abs() > max_resolution_delta {
        return false;
    }
    match (&a.underlying_entity, &b.underlying_entity) {
        (Some(ea), Some(eb)) => ea.trim().eq_ignore_ascii_case(eb.trim()),
        _ => true,
    }
}

/// Generates candidate pairs, venue A in the outer loop and venue B inner.
#[must_use]
pub fn prefilter(
    markets_a: &[Market],
    markets_b: &[Market],
    max_resolution_delta: Duration,
) -> Vec<MarketPair> {
    let eligible_b: Vec<&Market> = markets_b.iter().filter(|m| m.is_eligible()).collect();

    let pairs: Vec<MarketPair> = markets_a
        .iter()
        .filter(|a| a.is_eligible())
        .flat_map(|a| {
            eligible_b
                .iter()
                .filter(move |b| is_candidate(a, b, max_resolution_delta))
                .map(move |b| MarketPair::new(a.clone(), (*b).clone()))
        })
        .collect();

    debug!(
        markets_a = markets_a.len(),
        markets_b = markets_b.len(),
        candidates = pairs.len(),
        "Prefilter complete"
    );

    pairs
}
