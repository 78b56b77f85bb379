//! Error types for fetching, normalizing and matching markets.
//!
//! Per-attempt HTTP failures are classified as [`FetchError`]; once the retry
//! budget is spent they are wrapped with the venue as a [`SourceError`].
//! Malformed individual records are [`DataShapeError`]s and never abort a run.

use crate::types::Platform;
use thiserror::Error;

/// Classification of a single failed request to a venue.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No credential configured for the venue.
    #[error("missing credential")]
    MissingCredential,

    /// Credential rejected (HTTP 401/403).
    #[error("authentication rejected ({status}): {message}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// HTTP 429.
    #[error("rate limited")]
    RateLimited {
        /// Value of the Retry-After header, if any.
        retry_after_secs: Option<u64>,
    },

    /// Request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 5xx.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Any other non-success status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Response body was not a listings page.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Maps a non-success HTTP status to its error class.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Authentication { status, message },
            429 => Self::RateLimited {
                retry_after_secs: None,
            },
            500..=599 => Self::Server { status, message },
            _ => Self::Api { status, message },
        }
    }

    /// Returns true if another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) | Self::Server { .. }
        )
    }

    /// Returns true if the failure is a configuration fault.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::Authentication { .. })
    }

    /// Returns true for HTTP 429.
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Server-requested wait from a 429 `Retry-After` header.
    #[must_use]
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Venue-tagged fetch failure surfaced after the retry budget is spent.
#[derive(Debug, Error)]
#[error("{venue} fetch failed after {attempts} attempt(s): {kind}")]
pub struct SourceError {
    /// Venue that failed.
    pub venue: Platform,
    /// Number of requests actually sent.
    pub attempts: u32,
    /// Classification of the last failure.
    #[source]
    pub kind: FetchError,
}

impl SourceError {
    pub fn new(venue: Platform, attempts: u32, kind: FetchError) -> Self {
        Self {
            venue,
            attempts,
            kind,
        }
    }

    /// Missing credential, raised before any request.
    pub fn missing_credential(venue: Platform) -> Self {
        Self::new(venue, 0, FetchError::MissingCredential)
    }
}

/// Reason a single raw record could not be normalized.
#[derive(Debug, Error, PartialEq)]
pub enum DataShapeError {
    /// Record does not have the venue's expected shape.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// Resolution time missing or unparsable.
    #[error("unparsable resolution time: {0:?}")]
    UnparsableResolutionTime(Option<String>),

    /// Neither price leg present.
    #[error("both price legs missing")]
    MissingPrices,

    /// Price outside `[0, 1]` after scaling.
    #[error("price out of range: {0}")]
    PriceOutOfRange(f64),

    /// Not a two-outcome market.
    #[error("not a binary market")]
    NotBinary,
}

/// Failures of a semantic matcher backend.
#[derive(Debug, Error)]
pub enum MatcherError {
    /// No API key configured for the provider.
    #[error("missing API key for {provider}")]
    MissingApiKey {
        /// Provider name.
        provider: &'static str,
    },

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success response from the provider.
    #[error("provider error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Reply could not be interpreted.
    #[error("invalid matcher response: {0}")]
    InvalidResponse(String),

    /// Result count does not line up with candidate count.
    #[error("matcher returned {actual} results for {expected} candidates")]
    LengthMismatch {
        /// Number of candidates submitted.
        expected: usize,
        /// Number of results returned.
        actual: usize,
    },
}

impl From<reqwest::Error> for MatcherError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Fatal error for a scan run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A venue fetch failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The semantic matcher failed.
    #[error("semantic matcher failed: {0}")]
    Matcher(#[from] MatcherError),

    /// A venue integration is not available in this build.
    #[error("{venue} integration unavailable: {reason}")]
    VenueUnavailable {
        /// Venue without an integration.
        venue: Platform,
        /// Explanation.
        reason: String,
    },
}

impl PipelineError {
    /// Returns true if fixing configuration is the only remedy.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Source(err) => err.kind.is_configuration(),
            Self::Matcher(MatcherError::MissingApiKey { .. }) => true,
            Self::VenueUnavailable { .. } => true,
            Self::Matcher(_) => false,
        }
    }

    /// Returns true if the run failed on a transient condition after retries.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Source(err) if err.kind.is_retryable())
    }
}
