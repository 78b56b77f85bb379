//! Polymarket listings integration via the Gamma API.
//!
//! Polymarket is always venue B in a scan. [`GammaClient`] pages through
//! active markets and implements [`MarketSource`](edge_scan_core::MarketSource)
//! by normalizing each record with [`normalize`].

pub mod gamma;
pub mod models;
pub mod normalize;

pub use gamma::{GammaClient, GammaClientConfig, GAMMA_API_URL};
pub use models::RawGammaMarket;
pub use normalize::{normalize, try_normalize};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_exports() {
        let _ = GammaClientConfig::default();
        assert!(GAMMA_API_URL.starts_with("https://"));
    }
}
