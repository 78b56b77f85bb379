//! Shared domain types for a single scan run.
//!
//! Every entity here is created by exactly one pipeline stage and is never
//! mutated afterwards. Field names serialize in camelCase.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The two venues being compared.
///
/// `Kalshi` is always venue A and `Polymarket` is always venue B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Kalshi,
    Polymarket,
}

impl Platform {
    /// Returns the lowercase venue name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kalshi => "kalshi",
            Self::Polymarket => "polymarket",
        }
    }

    /// Human-readable venue name used in descriptions.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Kalshi => "Kalshi",
            Self::Polymarket => "Polymarket",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A venue listing normalized into the shared schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub platform: Platform,
    pub id: String,
    pub question: String,
    pub resolution_time: DateTime<Utc>,
    /// Implied probability of YES, in `[0, 1]`.
    pub yes_price: f64,
    /// Implied probability of NO, in `[0, 1]`. Independently quoted, so
    /// `yes_price + no_price` need not equal 1.
    pub no_price: f64,
    pub settlement_description: Option<String>,
    pub underlying_entity: Option<String>,
    pub is_binary: bool,
    pub is_active: bool,
}

impl Market {
    /// Returns true if the market may enter candidate generation.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.is_binary && self.is_active
    }

    /// Returns the price-free view of this market.
    #[must_use]
    pub fn descriptor(&self) -> MarketDescriptor {
        MarketDescriptor::from(self)
    }
}

/// Price-free view of a [`Market`].
///
/// This is the only market representation a semantic matcher ever receives.
/// It has no price fields, so a matcher cannot condition on quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDescriptor {
    pub platform: Platform,
    pub id: String,
    pub question: String,
    pub resolution_time: DateTime<Utc>,
    pub settlement_description: Option<String>,
    pub underlying_entity: Option<String>,
}

impl From<&Market> for MarketDescriptor {
    fn from(market: &Market) -> Self {
        Self {
            platform: market.platform,
            id: market.id.clone(),
            question: market.question.clone(),
            resolution_time: market.resolution_time,
            settlement_description: market.settlement_description.clone(),
            underlying_entity: market.underlying_entity.clone(),
        }
    }
}

/// One market from each venue, proposed as describing the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPair {
    pub market_a: Market,
    pub market_b: Market,
}

impl MarketPair {
    #[must_use]
    pub fn new(market_a: Market, market_b: Market) -> Self {
        Self { market_a, market_b }
    }

    /// Absolute distance between the two resolution times.
    #[must_use]
    pub fn resolution_delta(&self) -> Duration {
        (self.market_a.resolution_time - self.market_b.resolution_time).abs()
    }

    /// Absolute difference between the two YES prices.
    #[must_use]
    pub fn yes_price_gap(&self) -> f64 {
        (self.market_a.yes_price - self.market_b.yes_price).abs()
    }

    /// Builds the price-free candidate handed to a semantic matcher.
    #[must_use]
    pub fn candidate(&self) -> MatchCandidate {
        MatchCandidate {
            a: self.market_a.descriptor(),
            b: self.market_b.descriptor(),
        }
    }
}

/// Matcher input: a pair of price-free descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub a: MarketDescriptor,
    pub b: MarketDescriptor,
}

/// A semantic matcher's judgment for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticMatchResult {
    pub same_event: bool,
    pub same_outcome_semantics: bool,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub risks: Vec<String>,
}

impl SemanticMatchResult {
    /// A non-matching judgment carrying a single risk note.
    #[must_use]
    pub fn no_match(risk: impl Into<String>) -> Self {
        Self {
            same_event: false,
            same_outcome_semantics: false,
            confidence: 0.0,
            risks: vec![risk.into()],
        }
    }

    /// Returns true if both semantic flags are set.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.same_event && self.same_outcome_semantics
    }
}

/// A matcher judgment after deterministic re-checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedMatch {
    pub pair: MarketPair,
    pub match_result: SemanticMatchResult,
    pub passed: bool,
    pub issues: Vec<String>,
}

/// Informational pricing discrepancy between two validated markets.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrageOpportunity {
    pub pair: MarketPair,
    /// `|yes_a - yes_b| * 10_000`, always non-negative.
    pub edge_basis_points: f64,
    pub description: String,
    pub risks: Vec<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn market(platform: Platform, id: &str, yes: f64, hour: u32) -> Market {
        Market {
            platform,
            id: id.to_string(),
            question: format!("Will {id} happen?"),
            resolution_time: Utc.with_ymd_and_hms(2026, 11, 3, hour, 0, 0).unwrap(),
            yes_price: yes,
            no_price: 1.0 - yes,
            settlement_description: None,
            underlying_entity: None,
            is_binary: true,
            is_active: true,
        }
    }
}
