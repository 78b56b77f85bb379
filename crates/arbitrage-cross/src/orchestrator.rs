//! Scan pipeline: fetch, prefilter, match, validate, price.

use crate::edge::compute_opportunities;
use crate::prefilter::prefilter;
use crate::validator::validate;
use chrono::Duration;
use edge_scan_core::{
    AppConfig, ArbitrageOpportunity, Listing, MatchCandidate, MatcherError, PipelineError,
    SemanticMatcher, ThresholdsConfig, VenueFeed,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Thresholds for a single scan run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub min_edge_bps: f64,
    pub max_resolution_delta: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default().thresholds)
    }
}

impl From<&ThresholdsConfig> for PipelineConfig {
    fn from(thresholds: &ThresholdsConfig) -> Self {
        Self {
            min_edge_bps: thresholds.min_edge_bps,
            max_resolution_delta: thresholds.max_resolution_delta(),
        }
    }
}

/// Per-stage counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub markets_a: usize,
    pub markets_b: usize,
    pub skipped_a: usize,
    pub skipped_b: usize,
    pub candidates: usize,
    pub passed: usize,
    pub opportunities: usize,
}

/// Result of a successful run.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub opportunities: Vec<ArbitrageOpportunity>,
    pub stats: ScanStats,
}

/// Runs one scan across two venues.
pub struct ScanPipeline {
    config: PipelineConfig,
    feed_a: VenueFeed,
    feed_b: VenueFeed,
    matcher: Arc<dyn SemanticMatcher>,
}

impl std::fmt::Debug for ScanPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanPipeline")
            .field("config", &self.config)
            .field("feed_a", &self.feed_a)
            .field("feed_b", &self.feed_b)
            .field("matcher", &self.matcher.name())
            .finish()
    }
}

impl ScanPipeline {
    pub fn new(
        config: PipelineConfig,
        feed_a: VenueFeed,
        feed_b: VenueFeed,
        matcher: Arc<dyn SemanticMatcher>,
    ) -> Self {
        Self {
            config,
            feed_a,
            feed_b,
            matcher,
        }
    }

    /// Runs the pipeline once.
    ///
    /// # Errors
    /// Any venue failure, unavailable venue, or matcher failure aborts the
    /// run without partial results.
    pub async fn run(&self) -> Result<ScanReport, PipelineError> {
        let (listing_a, listing_b) = tokio::try_join!(fetch(&self.feed_a), fetch(&self.feed_b))?;

        let pairs = prefilter(
            &listing_a.markets,
            &listing_b.markets,
            self.config.max_resolution_delta,
        );

        let results = if pairs.is_empty() {
            debug!("No candidate pairs; skipping semantic matcher");
            Vec::new()
        } else {
            let candidates: Vec<MatchCandidate> = pairs.iter().map(|p| p.candidate()).collect();
            let results = self.matcher.evaluate(&candidates).await?;
            if results.len() != candidates.len() {
                return Err(MatcherError::LengthMismatch {
                    expected: candidates.len(),
                    actual: results.len(),
                }
                .into());
            }
            results
        };

        let validated = validate(&pairs, &results, self.config.max_resolution_delta);
        let opportunities = compute_opportunities(&validated, self.config.min_edge_bps);

        let stats = ScanStats {
            markets_a: listing_a.markets.len(),
            markets_b: listing_b.markets.len(),
            skipped_a: listing_a.skipped,
            skipped_b: listing_b.skipped,
            candidates: pairs.len(),
            passed: validated.iter().filter(|v| v.passed).count(),
            opportunities: opportunities.len(),
        };

        info!(
            venue_a = %listing_a.venue,
            venue_b = %listing_b.venue,
            markets_a = stats.markets_a,
            markets_b = stats.markets_b,
            skipped_a = stats.skipped_a,
            skipped_b = stats.skipped_b,
            candidates = stats.candidates,
            passed = stats.passed,
            opportunities = stats.opportunities,
            matcher = self.matcher.name(),
            "Scan complete"
        );

        Ok(ScanReport {
            opportunities,
            stats,
        })
    }
}

async fn fetch(feed: &VenueFeed) -> Result<Listing, PipelineError> {
    match feed {
        VenueFeed::Live(source) => Ok(source.fetch_markets().await?),
        VenueFeed::Unimplemented { venue, reason } => Err(PipelineError::VenueUnavailable {
            venue: *venue,
            reason: reason.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::NoopMatcher;
    use crate::test_support::{confirmed, market_at, FixedMatcher, StaticSource};
    use edge_scan_core::Platform;

    fn config() -> PipelineConfig {
        PipelineConfig {
            min_edge_bps: 50.0,
            max_resolution_delta: Duration::hours(24),
        }
    }

    fn feeds(yes_a: f64, yes_b: f64) -> (VenueFeed, VenueFeed) {
        (
            VenueFeed::live(StaticSource::new(
                Platform::Kalshi,
                vec![market_at(Platform::Kalshi, "KX", yes_a, 0)],
            )),
            VenueFeed::live(StaticSource::new(
                Platform::Polymarket,
                vec![market_at(Platform::Polymarket, "PM", yes_b, 1)],
            )),
        )
    }

    // ==================== Config Tests ====================

    #[test]
    fn test_config_from_thresholds() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_edge_bps, 50.0);
        assert_eq!(config.max_resolution_delta, Duration::hours(24));
    }

    // ==================== Run Tests ====================

    #[tokio::test]
    async fn test_run_emits_opportunity() {
        let (a, b) = feeds(0.40, 0.55);
        let matcher = Arc::new(FixedMatcher::new(confirmed(0.9)));
        let pipeline = ScanPipeline::new(config(), a, b, matcher.clone());

        let report = pipeline.run().await.unwrap();

        assert_eq!(report.opportunities.len(), 1);
        assert_eq!(report.stats.candidates, 1);
        assert_eq!(report.stats.passed, 1);
        assert_eq!(report.stats.markets_a, 1);
        assert_eq!(matcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_noop_matcher_yields_nothing() {
        let (a, b) = feeds(0.10, 0.90);
        let pipeline = ScanPipeline::new(config(), a, b, Arc::new(NoopMatcher));

        let report = pipeline.run().await.unwrap();
        assert!(report.opportunities.is_empty());
        assert_eq!(report.stats.candidates, 1);
        assert_eq!(report.stats.passed, 0);
    }

    #[tokio::test]
    async fn test_zero_candidates_skip_matcher() {
        let a = VenueFeed::live(StaticSource::new(Platform::Kalshi, vec![]));
        let (_, b) = feeds(0.4, 0.5);
        let matcher = Arc::new(FixedMatcher::new(confirmed(0.9)));
        let pipeline = ScanPipeline::new(config(), a, b, matcher.clone());

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.stats.candidates, 0);
        assert_eq!(matcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_unimplemented_feed_is_error() {
        let (a, _) = feeds(0.4, 0.5);
        let b = VenueFeed::unimplemented(Platform::Polymarket, "integration not available");
        let pipeline = ScanPipeline::new(config(), a, b, Arc::new(NoopMatcher));

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::VenueUnavailable { venue: Platform::Polymarket, .. }
        ));
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_length_mismatch_is_error() {
        let (a, b) = feeds(0.40, 0.55);
        let matcher = Arc::new(FixedMatcher::new(confirmed(0.9)).returning_extra());
        let pipeline = ScanPipeline::new(config(), a, b, matcher);

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Matcher(MatcherError::LengthMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }
}
