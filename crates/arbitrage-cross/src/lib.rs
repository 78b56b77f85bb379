//! Cross-venue market matching and edge detection.
//!
//! Compares normalized Kalshi (venue A) and Polymarket (venue B) listings and
//! reports informational pricing discrepancies between markets that describe
//! the same event.
//!
//! # Pipeline
//!
//! ```text
//! fetch A ─┐
//!          ├─► prefilter ─► semantic matcher ─► validator ─► edge ─► report
//! fetch B ─┘   (time/entity)  (no prices)        (re-check)   (bps)
//! ```
//!
//! # Modules
//!
//! - [`prefilter`]: price-blind candidate pairing by resolution time and entity
//! - [`matcher`]: [`NoopMatcher`] and the batched [`LlmMatcher`]
//! - [`llm`]: OpenAI and Anthropic completion clients
//! - [`validator`]: deterministic re-check of matcher judgments
//! - [`edge`]: basis-point edge and opportunity construction
//! - [`orchestrator`]: the [`ScanPipeline`] run
//! - [`report`]: the JSON output record
//!
//! # Example
//!
//! ```ignore
//! use edge_scan_arbitrage_cross::{build_matcher, PipelineConfig, ScanPipeline};
//! use edge_scan_core::{AppConfig, VenueFeed};
//!
//! let app = AppConfig::default();
//! let pipeline = ScanPipeline::new(
//!     PipelineConfig::from(&app.thresholds),
//!     VenueFeed::live(kalshi),
//!     VenueFeed::live(polymarket),
//!     build_matcher(&app.matcher)?,
//! );
//! let report = pipeline.run().await?;
//! ```

pub mod edge;
pub mod llm;
pub mod matcher;
pub mod orchestrator;
pub mod prefilter;
pub mod report;
pub mod validator;

pub use edge::{compute_opportunities, edge_bps};
pub use llm::{build_llm, AnthropicClient, Llm, LlmSettings, OpenAiClient};
pub use matcher::{build_matcher, LlmMatcher, NoopMatcher};
pub use orchestrator::{PipelineConfig, ScanPipeline, ScanReport, ScanStats};
pub use prefilter::{is_candidate, prefilter};
pub use report::{to_records, OpportunityRecord};
pub use validator::{validate, validate_one};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::llm::Llm;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use edge_scan_core::{
        Listing, Market, MarketSource, MatchCandidate, MatcherError, Platform,
        SemanticMatchResult, SemanticMatcher, SourceError,
    };
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    pub fn market_at(platform: Platform, id: &str, yes: f64, hours: i64) -> Market {
        Market {
            platform,
            id: id.to_string(),
            question: format!("Will {id} happen?"),
            resolution_time: Utc.with_ymd_and_hms(2026, 11, 3, 0, 0, 0).unwrap()
                + Duration::hours(hours),
            yes_price: yes,
            no_price: 1.0 - yes,
            settlement_description: None,
            underlying_entity: None,
            is_binary: true,
            is_active: true,
        }
    }

    pub fn confirmed(confidence: f64) -> SemanticMatchResult {
        SemanticMatchResult {
            same_event: true,
            same_outcome_semantics: true,
            confidence,
            risks: vec![],
        }
    }

    /// Replies with scripted responses in order and records prompts.
    pub struct MockLlm {
        responses: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockLlm {
        pub fn new(responses: Vec<String>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Llm for MockLlm {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn complete(&self, prompt: &str) -> Result<String, MatcherError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| MatcherError::Http("no scripted response".to_string()))
        }
    }

    /// Returns the same judgment for every candidate.
    pub struct FixedMatcher {
        result: SemanticMatchResult,
        extra: bool,
        calls: AtomicUsize,
    }

    impl FixedMatcher {
        pub fn new(result: SemanticMatchResult) -> Self {
            Self {
                result,
                extra: false,
                calls: AtomicUsize::new(0),
            }
        }

        /// Appends one result too many.
        pub fn returning_extra(mut self) -> Self {
            self.extra = true;
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SemanticMatcher for FixedMatcher {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn evaluate(
            &self,
            candidates: &[MatchCandidate],
        ) -> Result<Vec<SemanticMatchResult>, MatcherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let count = candidates.len() + usize::from(self.extra);
            Ok(vec![self.result.clone(); count])
        }
    }

    /// Serves a fixed set of markets.
    pub struct StaticSource {
        platform: Platform,
        markets: Vec<Market>,
    }

    impl StaticSource {
        pub fn new(platform: Platform, markets: Vec<Market>) -> Self {
            Self { platform, markets }
        }
    }

    #[async_trait]
    impl MarketSource for StaticSource {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn fetch_markets(&self) -> Result<Listing, SourceError> {
            Ok(Listing {
                venue: self.platform,
                markets: self.markets.clone(),
                skipped: 0,
            })
        }
    }
}
