//! HTTP plumbing shared by venue clients.

use crate::error::FetchError;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Unkeyed in-memory rate limiter used by every venue client.
pub type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Creates a limiter allowing `requests_per_minute` requests.
#[must_use]
pub fn rate_limiter(requests_per_minute: NonZeroU32) -> Arc<DirectRateLimiter> {
    Arc::new(RateLimiter::direct(Quota::per_minute(requests_per_minute)))
}

/// Builds a reqwest client whose requests are bounded by `timeout`.
///
/// # Errors
/// Returns [`FetchError::Network`] if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))
}

/// Classifies a response and decodes a successful body.
///
/// # Errors
/// 401/403, 429, 5xx and other non-success statuses map to their
/// [`FetchError`] variants; an undecodable body maps to [`FetchError::Decode`].
pub async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, FetchError> {
    let status = response.status();

    if status.as_u16() == 429 {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());
        return Err(FetchError::RateLimited { retry_after_secs });
    }

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(FetchError::from_status(status.as_u16(), text));
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
