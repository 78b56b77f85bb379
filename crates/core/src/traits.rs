use crate::error::{MatcherError, SourceError};
use crate::types::{Market, MatchCandidate, Platform, SemanticMatchResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Normalized listings from one venue fetch.
#[derive(Debug, Clone)]
pub struct Listing {
    /// Venue the markets were fetched from.
    pub venue: Platform,
    pub markets: Vec<Market>,
    /// Raw records dropped by the normalizer.
    pub skipped: usize,
}

/// A venue that can produce normalized market listings.
#[async_trait]
pub trait MarketSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetches every listing page and normalizes the records.
    async fn fetch_markets(&self) -> Result<Listing, SourceError>;
}

/// Judges whether two markets describe the same event and outcome.
///
/// Implementations return exactly one result per candidate, in input order.
#[async_trait]
pub trait SemanticMatcher: Send + Sync {
    fn name(&self) -> &str;

    async fn evaluate(
        &self,
        candidates: &[MatchCandidate],
    ) -> Result<Vec<SemanticMatchResult>, MatcherError>;
}

/// A venue slot in a scan run.
///
/// `Unimplemented` stands in for an integration that does not exist in this
/// build; running a pipeline with one yields an explicit error.
#[derive(Clone)]
pub enum VenueFeed {
    Live(Arc<dyn MarketSource>),
    Unimplemented { venue: Platform, reason: String },
}

impl VenueFeed {
    pub fn live(source: impl MarketSource + 'static) -> Self {
        Self::Live(Arc::new(source))
    }

    pub fn unimplemented(venue: Platform, reason: impl Into<String>) -> Self {
        Self::Unimplemented {
            venue,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            Self::Live(source) => source.platform(),
            Self::Unimplemented { venue, .. } => *venue,
        }
    }
}

impl std::fmt::Debug for VenueFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live(source) => f.debug_tuple("Live").field(&source.platform()).finish(),
            Self::Unimplemented { venue, reason } => f
                .debug_struct("Unimplemented")
                .field("venue", venue)
                .field("reason", reason)
                .finish(),
        }
    }
}
