//! Edge calculation over validated matches.
//!
//! The edge is the absolute YES-price gap in basis points. Fees, slippage
//! and execution are deliberately absent: opportunities are informational.

use edge_scan_core::{ArbitrageOpportunity, MarketPair, ValidatedMatch};

/// Basis points per unit of probability.
pub const BPS_PER_UNIT: f64 = 10_000.0;

/// Edge in basis points between the two YES prices of a pair.
#[must_use]
pub fn edge_bps(pair: &MarketPair) -> f64 {
    pair.yes_price_gap() * BPS_PER_UNIT
}

/// Human-readable summary attached to each opportunity.
#[must_use]
pub fn describe(pair: &MarketPair) -> String {
    format!(
        "Detected price discrepancy between {} and {} for markets '{}' and '{}'. \
         Informational signal only; fees, slippage and execution are not modeled.",
        pair.market_a.platform.display_name(),
        pair.market_b.platform.display_name(),
        pair.market_a.question,
        pair.market_b.question,
    )
}

/// Emits an opportunity for every passed match whose edge reaches `min_edge_bps`.
#[must_use]
pub fn compute_opportunities(
    validated: &[ValidatedMatch],
    min_edge_bps: f64,
) -> Vec<ArbitrageOpportunity> {
    validated
        .iter()
        .filter(|v| v.passed)
        .filter_map(|v| {
            let edge = edge_bps(&v.pair);
            if edge < min_edge_bps {
                return None;
            }

            let risks = v
                .match_result
                .risks
                .iter()
                .chain(&v.issues)
                .cloned()
                .collect();

            Some(ArbitrageOpportunity {
                pair: v.pair.clone(),
                edge_basis_points: edge,
                description: describe(&v.pair),
                risks,
            })
        })
        .collect()
}
