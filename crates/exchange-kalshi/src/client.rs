//! Kalshi REST listings client.
//!
//! Pages through `GET /markets` with cursor pagination, bearer auth, rate
//! limiting and bounded retry per page.
//!
//! # Example
//!
//! ```ignore
//! use edge_scan_kalshi::{KalshiClient, KalshiClientConfig};
//! use edge_scan_core::BearerToken;
//!
//! let client = KalshiClient::new(
//!     KalshiClientConfig::default().with_credential(BearerToken::new("token")),
//! )?;
//! let records = client.fetch_raw_listings().await?;
//! ```

use crate::normalize::normalize;
use async_trait::async_trait;
use edge_scan_core::http::{build_client, decode_response, rate_limiter, DirectRateLimiter};
use edge_scan_core::{
    retry_with_backoff, BearerToken, FetchError, Listing, MarketSource, Platform, RetryPolicy,
    SourceError, VenueConfig,
};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

// =============================================================================
// Constants
// =============================================================================

/// Kalshi production API base URL.
pub const KALSHI_API_URL: &str = edge_scan_core::config::DEFAULT_KALSHI_URL;

/// Path prefix every Kalshi REST route lives under.
const API_PREFIX: &str = "/trade-api/v2";

/// Status filter for the listings request.
const OPEN_STATUS: &str = "open";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Kalshi client.
#[derive(Debug, Clone)]
pub struct KalshiClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// Bearer token. Fetching fails fast when absent.
    pub credential: Option<BearerToken>,

    /// Markets requested per page.
    pub page_size: u32,

    /// Upper bound on pages fetched per run.
    pub max_pages: u32,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Retry policy applied to every page request.
    pub retry: RetryPolicy,
}

impl Default for KalshiClientConfig {
    fn default() -> Self {
        Self {
            base_url: KALSHI_API_URL.to_string(),
            credential: None,
            page_size: 100,
            max_pages: 50,
            requests_per_minute: nonzero!(60u32),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }
}

impl KalshiClientConfig {
    /// Builds a client configuration from the run configuration.
    #[must_use]
    pub fn from_venue(venue: &VenueConfig, retry: RetryPolicy) -> Self {
        let mut config = Self {
            base_url: venue.base_url.clone(),
            credential: BearerToken::from_config(venue.api_key.as_deref()),
            page_size: venue.page_size.max(1),
            max_pages: venue.max_pages.max(1),
            timeout_secs: venue.timeout_secs,
            retry,
            ..Self::default()
        };
        if let Some(rpm) = NonZeroU32::new(venue.requests_per_minute) {
            config.requests_per_minute = rpm;
        }
        config
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_credential(mut self, credential: BearerToken) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the page limit.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Ensures the base URL ends with the `/trade-api/v2` prefix.
fn api_root(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with(API_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{API_PREFIX}")
    }
}

// =============================================================================
// API Response Types
// =============================================================================

/// One page of `GET /markets`.
///
/// Records stay untyped here so that a single malformed market is dropped by
/// the normalizer instead of failing the whole page.
#[derive(Debug, Clone, Deserialize)]
struct RawMarketsPage {
    markets: Option<Vec<serde_json::Value>>,
    cursor: Option<String>,
}

// =============================================================================
// KalshiClient
// =============================================================================

/// Kalshi listings client.
pub struct KalshiClient {
    config: KalshiClientConfig,
    api_root: String,
    http: Client,
    rate_limiter: Arc<DirectRateLimiter>,
}

impl std::fmt::Debug for KalshiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KalshiClient")
            .field("api_root", &self.api_root)
            .field("page_size", &self.config.page_size)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl KalshiClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: KalshiClientConfig) -> Result<Self, SourceError> {
        let http = build_client(Duration::from_secs(config.timeout_secs))
            .map_err(|e| SourceError::new(Platform::Kalshi, 0, e))?;

        Ok(Self {
            api_root: api_root(&config.base_url),
            rate_limiter: rate_limiter(config.requests_per_minute),
            config,
            http,
        })
    }

    /// Returns the resolved API root.
    #[must_use]
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Fetches every open market record, page by page.
    ///
    /// # Errors
    /// Fails before any request when no credential is configured; otherwise
    /// returns the first page failure that survives the retry policy.
    pub async fn fetch_raw_listings(&self) -> Result<Vec<serde_json::Value>, SourceError> {
        let token = self
            .config
            .credential
            .as_ref()
            .ok_or_else(|| SourceError::missing_credential(Platform::Kalshi))?;

        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        for page_number in 1..=self.config.max_pages {
            let page = retry_with_backoff(&self.config.retry, Platform::Kalshi, "list_markets", || {
                self.get_page(token, cursor.as_deref())
            })
            .await?;

            let markets = page.markets.unwrap_or_default();
            if markets.is_empty() {
                debug!(page = page_number, "Empty page, stopping");
                break;
            }
            debug!(page = page_number, count = markets.len(), "Fetched Kalshi page");
            records.extend(markets);

            cursor = page.cursor.filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        Ok(records)
    }

    /// Waits for the rate limiter and requests one page.
    async fn get_page(
        &self,
        token: &BearerToken,
        cursor: Option<&str>,
    ) -> Result<RawMarketsPage, FetchError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/markets", self.api_root);
        let mut query: Vec<(&str, String)> = vec![
            ("status", OPEN_STATUS.to_string()),
            ("limit", self.config.page_size.to_string()),
        ];
        if let Some(c) = cursor {
            query.push(("cursor", c.to_string()));
        }

        debug!(url = %url, cursor = ?cursor, "GET");

        let response = self
            .http
            .get(&url)
            .query(&query)
            .header("Accept", "application/json")
            .header("Authorization", token.header_value())
            .send()
            .await?;

        decode_response(response).await
    }
}

#[async_trait]
impl MarketSource for KalshiClient {
    fn platform(&self) -> Platform {
        Platform::Kalshi
    }

    async fn fetch_markets(&self) -> Result<Listing, SourceError> {
        let records = self.fetch_raw_listings().await?;
        let total = records.len();
        let markets: Vec<_> = records.iter().filter_map(normalize).collect();
        let skipped = total - markets.len();

        info!(
            venue = "kalshi",
            records = total,
            markets = markets.len(),
            skipped,
            "Normalized listings"
        );

        Ok(Listing {
            venue: Platform::Kalshi,
            markets,
            skipped,
        })
    }
}
