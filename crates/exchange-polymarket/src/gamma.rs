//! Gamma API client for market listings.
//!
//! Uses offset pagination over `GET /markets?active=true&closed=false`.
//! Records are returned untyped so the normalizer can drop malformed ones
//! individually.

use crate::normalize::normalize;
use async_trait::async_trait;
use edge_scan_core::http::{build_client, decode_response, rate_limiter, DirectRateLimiter};
use edge_scan_core::{
    retry_with_backoff, BearerToken, FetchError, Listing, MarketSource, Platform, RetryPolicy,
    SourceError, VenueConfig,
};
use nonzero_ext::nonzero;
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Gamma API base URL.
pub const GAMMA_API_URL: &str = edge_scan_core::config::DEFAULT_POLYMARKET_URL;

/// Configuration for the Gamma client.
#[derive(Debug, Clone)]
pub struct GammaClientConfig {
    pub base_url: String,
    pub credential: Option<BearerToken>,
    pub page_size: u32,
    pub max_pages: u32,
    pub requests_per_minute: NonZeroU32,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for GammaClientConfig {
    fn default() -> Self {
        Self {
            base_url: GAMMA_API_URL.to_string(),
            credential: None,
            page_size: 100,
            max_pages: 50,
            requests_per_minute: nonzero!(60u32),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }
}

impl GammaClientConfig {
    /// Builds a client configuration from the run configuration.
    #[must_use]
    pub fn from_venue(venue: &VenueConfig, retry: RetryPolicy) -> Self {
        Self {
            base_url: venue.base_url.clone(),
            credential: BearerToken::from_config(venue.api_key.as_deref()),
            page_size: venue.page_size.max(1),
            max_pages: venue.max_pages.max(1),
            requests_per_minute: NonZeroU32::new(venue.requests_per_minute)
                .unwrap_or(nonzero!(60u32)),
            timeout_secs: venue.timeout_secs,
            retry,
        }
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_credential(mut self, credential: BearerToken) -> Self {
        self.credential = Some(credential);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Gamma API listings client.
pub struct GammaClient {
    /// Client settings
    config: GammaClientConfig,
    /// HTTP client
    http: Client,
    /// Rate limiter (requests per minute)
    rate_limiter: Arc<DirectRateLimiter>,
}

impl std::fmt::Debug for GammaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GammaClient")
            .field("base_url", &self.config.base_url)
            .field("page_size", &self.config.page_size)
            .finish_non_exhaustive()
    }
}

impl GammaClient {
    /// Creates a new client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: GammaClientConfig) -> Result<Self, SourceError> {
        let http = build_client(Duration::from_secs(config.timeout_secs))
            .map_err(|e| SourceError::new(Platform::Polymarket, 0, e))?;

        Ok(Self {
            rate_limiter: rate_limiter(config.requests_per_minute),
            config,
            http,
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Fetches every active, unclosed market record.
    ///
    /// # Errors
    /// Fails before any request when no credential is configured; otherwise
    /// returns the first page failure that survives the retry policy.
    pub async fn fetch_raw_listings(&self) -> Result<Vec<serde_json::Value>, SourceError> {
        let token = self
            .config
            .credential
            .as_ref()
            .ok_or_else(|| SourceError::missing_credential(Platform::Polymarket))?;

        let page_size = self.config.page_size as usize;
        let mut records = Vec::new();

        for page_number in 0..self.config.max_pages {
            let offset = records.len();
            let page = retry_with_backoff(
                &self.config.retry,
                Platform::Polymarket,
                "list_markets",
                || self.get_page(token, offset),
            )
            .await?;

            let count = page.len();
            debug!(page = page_number + 1, offset, count, "Fetched Gamma page");
            records.extend(page);

            if count < page_size {
                break;
            }
        }

        Ok(records)
    }

    /// Waits for the rate limiter and requests one page.
    async fn get_page(
        &self,
        token: &BearerToken,
        offset: usize,
    ) -> Result<Vec<serde_json::Value>, FetchError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/markets", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, offset, "GET");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("active", "true".to_string()),
                ("closed", "false".to_string()),
                ("limit", self.config.page_size.to_string()),
                ("offset", offset.to_string()),
            ])
            .header("Accept", "application/json")
            .header("Authorization", token.header_value())
            .send()
            .await?;

        decode_response(response).await
    }
}

#[async_trait]
impl MarketSource for GammaClient {
    fn platform(&self) -> Platform {
        Platform::Polymarket
    }

    async fn fetch_markets(&self) -> Result<Listing, SourceError> {
        let records = self.fetch_raw_listings().await?;
        let total = records.len();
        let markets: Vec<_> = records.iter().filter_map(normalize).collect();
        let skipped = total - markets.len();

        info!(
            venue = "polymarket",
            records = total,
            markets = markets.len(),
            skipped,
            "Normalized listings"
        );

        Ok(Listing {
            venue: Platform::Polymarket,
            markets,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> GammaClientConfig {
        GammaClientConfig::default()
            .with_base_url(server.uri())
            .with_credential(BearerToken::new("gamma-token"))
            .with_retry(RetryPolicy::default().with_backoff_unit(Duration::from_millis(1)))
    }

    fn market_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "question": format!("Will {id} resolve yes?"),
            "endDate": "2026-11-03T21:00:00Z",
            "active": true,
            "closed": false,
            "outcomes": "[\"Yes\", \"No\"]",
            "outcomePrices": "[\"0.5\", \"0.5\"]"
        })
    }

    #[test]
    fn test_config_default() {
        let config = GammaClientConfig::default();
        assert_eq!(config.base_url, GAMMA_API_URL);
        assert!(config.credential.is_none());
    }

    #[test]
    fn test_client_with_base_url() {
        let client =
            GammaClient::new(GammaClientConfig::default().with_base_url("http://localhost:8080"))
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_offset_paging_stops_on_short_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets"))
            .and(query_param("active", "true"))
            .and(query_param("closed", "false"))
            .and(query_param("limit", "2"))
            .and(query_param("offset", "0"))
            .and(header("Authorization", "Bearer gamma-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([market_json("1"), market_json("2")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/markets"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([market_json("3")])))
            .expect(1)
            .mount(&server)
            .await;

        let client = GammaClient::new(test_config(&server).with_page_size(2)).unwrap();
        let records = client.fetch_raw_listings().await.unwrap();

        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = GammaClient::new(test_config(&server)).unwrap();
        let listing = client.fetch_markets().await.unwrap();
        assert!(listing.markets.is_empty());
        assert_eq!(listing.skipped, 0);
        assert_eq!(listing.venue, Platform::Polymarket);
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client =
            GammaClient::new(GammaClientConfig::default().with_base_url(server.uri())).unwrap();
        let err = client.fetch_raw_listings().await.unwrap_err();

        assert_eq!(err.venue, Platform::Polymarket);
        assert!(matches!(err.kind, FetchError::MissingCredential));
    }

    #[tokio::test]
    async fn test_rate_limit_exhausts_three_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let client = GammaClient::new(test_config(&server)).unwrap();
        let err = client.fetch_raw_listings().await.unwrap_err();

        assert_eq!(err.attempts, 3);
        assert!(err.kind.is_rate_limit());
    }

    #[tokio::test]
    async fn test_forbidden_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let client = GammaClient::new(test_config(&server)).unwrap();
        let err = client.fetch_raw_listings().await.unwrap_err();
        assert!(err.kind.is_configuration());
    }

    #[tokio::test]
    async fn test_fetch_markets_counts_skipped() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                market_json("good"),
                {"id": "multi", "question": "Who wins?", "endDate": "2026-11-03T21:00:00Z",
                 "outcomes": "[\"A\", \"B\", \"C\"]", "outcomePrices": "[\"0.3\", \"0.3\", \"0.4\"]"}
            ])))
            .mount(&server)
            .await;

        let client = GammaClient::new(test_config(&server)).unwrap();
        let listing = client.fetch_markets().await.unwrap();

        assert_eq!(listing.markets.len(), 1);
        assert_eq!(listing.skipped, 1);
    }
}
