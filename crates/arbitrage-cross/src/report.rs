//! JSON output record for detected opportunities.

use edge_scan_core::{ArbitrageOpportunity, Market, MarketPair};
use serde::{Deserialize, Serialize};

/// One opportunity as emitted on stdout.
///
/// Field order is part of the output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    #[serde(rename = "venueA_market")]
    pub venue_a_market: Market,
    #[serde(rename = "venueB_market")]
    pub venue_b_market: Market,
    #[serde(rename = "edgeBasisPoints")]
    pub edge_basis_points: f64,
    pub description: String,
    pub risks: Vec<String>,
}

impl From<&ArbitrageOpportunity> for OpportunityRecord {
    fn from(op: &ArbitrageOpportunity) -> Self {
        Self {
            venue_a_market: op.pair.market_a.clone(),
            venue_b_market: op.pair.market_b.clone(),
            edge_basis_points: op.edge_basis_points,
            description: op.description.clone(),
            risks: op.risks.clone(),
        }
    }
}

impl From<OpportunityRecord> for ArbitrageOpportunity {
    fn from(record: OpportunityRecord) -> Self {
        Self {
            pair: MarketPair::new(record.venue_a_market, record.venue_b_market),
            edge_basis_points: record.edge_basis_points,
            description: record.description,
            risks: record.risks,
        }
    }
}

/// Converts opportunities into output records, preserving order.
#[must_use]
pub fn to_records(opportunities: &[ArbitrageOpportunity]) -> Vec<OpportunityRecord> {
    opportunities.iter().map(OpportunityRecord::from).collect()
}
