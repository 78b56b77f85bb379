//! Shared building blocks for cross-venue prediction-market scanning.
//!
//! - [`types`]: normalized markets, candidate pairs and pipeline outputs
//! - [`normalize`]: price, status and binary rules applied by every venue
//! - [`retry`]: bounded linear-backoff retry for venue requests
//! - [`http`] / [`credential`]: response classification, rate limiting, bearer auth
//! - [`traits`]: [`MarketSource`] and [`SemanticMatcher`] seams
//! - [`config`] / [`config_loader`]: run configuration via figment

pub mod config;
pub mod config_loader;
pub mod credential;
pub mod error;
pub mod http;
pub mod normalize;
pub mod retry;
pub mod traits;
pub mod types;

pub use config::{
    AppConfig, MatcherConfig, MatcherProvider, RetryConfig, ThresholdsConfig, VenueConfig,
};
pub use config_loader::ConfigLoader;
pub use credential::BearerToken;
pub use error::{DataShapeError, FetchError, MatcherError, PipelineError, SourceError};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use traits::{Listing, MarketSource, SemanticMatcher, VenueFeed};
pub use types::{
    ArbitrageOpportunity, Market, MarketDescriptor, MarketPair, MatchCandidate, Platform,
    SemanticMatchResult, ValidatedMatch,
};
