use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_KALSHI_URL: &str = "https://api.elections.kalshi.com/trade-api/v2";
pub const DEFAULT_POLYMARKET_URL: &str = "https://gamma-api.polymarket.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub thresholds: ThresholdsConfig,
    pub kalshi: VenueConfig,
    pub polymarket: VenueConfig,
    pub retry: RetryConfig,
    pub matcher: MatcherConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Minimum edge in basis points for an opportunity to be reported.
    pub min_edge_bps: f64,
    /// Maximum allowed distance between resolution times, in seconds.
    pub max_resolution_delta_secs: i64,
}

impl ThresholdsConfig {
    #[must_use]
    pub fn max_resolution_delta(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.max_resolution_delta_secs)
    }
}

/// Connection settings for one venue.
#[derive(Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    pub base_url: String,
    /// Bearer token. Absent means the venue cannot be fetched.
    pub api_key: Option<String>,
    pub page_size: u32,
    pub max_pages: u32,
    pub timeout_secs: u64,
    pub requests_per_minute: u32,
}

impl VenueConfig {
    fn with_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: None,
            page_size: 100,
            max_pages: 50,
            timeout_secs: 10,
            requests_per_minute: 60,
        }
    }
}

impl std::fmt::Debug for VenueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VenueConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("timeout_secs", &self.timeout_secs)
            .field("requests_per_minute", &self.requests_per_minute)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_unit_ms: u64,
}

impl RetryConfig {
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_backoff_unit(Duration::from_millis(self.backoff_unit_ms))
    }
}

/// Which semantic matcher backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherProvider {
    /// Stand-in that never confirms a match.
    #[default]
    Noop,
    OpenAi,
    Anthropic,
}

impl std::str::FromStr for MatcherProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "noop" | "none" => Ok(Self::Noop),
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(format!("unknown matcher provider: {other}")),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub provider: MatcherProvider,
    pub model: String,
    pub api_key: Option<String>,
    /// Optional override of the provider endpoint.
    pub base_url: Option<String>,
    pub max_candidates_per_batch: usize,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for MatcherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("max_candidates_per_batch", &self.max_candidates_per_batch)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdsConfig {
                min_edge_bps: 50.0,
                max_resolution_delta_secs: 24 * 60 * 60,
            },
            kalshi: VenueConfig::with_url(DEFAULT_KALSHI_URL),
            polymarket: VenueConfig::with_url(DEFAULT_POLYMARKET_URL),
            retry: RetryConfig {
                max_attempts: 3,
                backoff_unit_ms: 1000,
            },
            matcher: MatcherConfig {
                provider: MatcherProvider::Noop,
                model: "gpt-4.1-mini".to_string(),
                api_key: None,
                base_url: None,
                max_candidates_per_batch: 20,
                max_tokens: 2048,
                temperature: 0.0,
                timeout_secs: 60,
            },
        }
    }
}

impl AppConfig {
    /// Checks values a run cannot proceed with.
    ///
    /// # Errors
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if !self.thresholds.min_edge_bps.is_finite() || self.thresholds.min_edge_bps < 0.0 {
            return Err("thresholds.min_edge_bps must be a non-negative number".to_string());
        }
        if self.thresholds.max_resolution_delta_secs < 0 {
            return Err("thresholds.max_resolution_delta_secs must not be negative".to_string());
        }
        for (name, venue) in [("kalshi", &self.kalshi), ("polymarket", &self.polymarket)] {
            if venue.page_size == 0 {
                return Err(format!("{name}.page_size must be positive"));
            }
            if venue.max_pages == 0 {
                return Err(format!("{name}.max_pages must be positive"));
            }
            if venue.requests_per_minute == 0 {
                return Err(format!("{name}.requests_per_minute must be positive"));
            }
        }
        if self.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be positive".to_string());
        }
        if self.matcher.max_candidates_per_batch == 0 {
            return Err("matcher.max_candidates_per_batch must be positive".to_string());
        }
        Ok(())
    }
}
