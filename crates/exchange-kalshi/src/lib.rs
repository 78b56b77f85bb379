//! Kalshi listings integration.
//!
//! This crate provides:
//! - A paged REST client for `GET /markets` with bearer auth, rate limiting
//!   and bounded retry
//! - Normalization of raw Kalshi market records into the shared [`Market`] schema
//!
//! Kalshi is always venue A in a scan.
//!
//! # Example
//!
//! ```ignore
//! use edge_scan_core::{AppConfig, MarketSource};
//! use edge_scan_kalshi::{KalshiClient, KalshiClientConfig};
//!
//! let app = AppConfig::default();
//! let client = KalshiClient::new(KalshiClientConfig::from_venue(&app.kalshi, app.retry.policy()))?;
//! let listing = client.fetch_markets().await?;
//! println!("{} markets, {} skipped", listing.markets.len(), listing.skipped);
//! ```
//!
//! # API Endpoints
//!
//! - `GET /markets?status=open&limit=N[&cursor=C]` - List open markets
//!
//! [`Market`]: edge_scan_core::Market

pub mod client;
pub mod normalize;

pub use client::{KalshiClient, KalshiClientConfig, KALSHI_API_URL};
pub use normalize::{normalize, try_normalize, RawKalshiMarket};
