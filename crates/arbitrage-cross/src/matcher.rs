//! Semantic matcher implementations.
//!
//! - [`NoopMatcher`] rejects every candidate; used when no backend is configured.
//! - [`LlmMatcher`] asks a language model, in batches, whether each pair
//!   resolves on the same event with the same outcome definition.

use crate::llm::{build_llm, Llm};
use async_trait::async_trait;
use edge_scan_core::{
    MarketDescriptor, MatchCandidate, MatcherConfig, MatcherError, SemanticMatchResult,
    SemanticMatcher,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Risk note attached by [`NoopMatcher`].
pub const NO_MATCHER_RISK: &str =
    "No semantic matcher configured; pair cannot be confirmed as the same event.";

/// Default number of candidates per model request.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Matcher that never confirms a pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMatcher;

#[async_trait]
impl SemanticMatcher for NoopMatcher {
    fn name(&self) -> &str {
        "noop"
    }

    async fn evaluate(
        &self,
        candidates: &[MatchCandidate],
    ) -> Result<Vec<SemanticMatchResult>, MatcherError> {
        Ok(candidates
            .iter()
            .map(|_| SemanticMatchResult::no_match(NO_MATCHER_RISK))
            .collect())
    }
}

/// LLM-backed semantic matcher.
pub struct LlmMatcher<L: Llm + ?Sized> {
    llm: Arc<L>,
    batch_size: usize,
}

impl<L: Llm + ?Sized> std::fmt::Debug for LlmMatcher<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmMatcher")
            .field("provider", &self.llm.name())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl<L: Llm + ?Sized> LlmMatcher<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self {
            llm,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Evaluates one batch with a single completion call.
    async fn evaluate_batch(
        &self,
        batch: &[MatchCandidate],
    ) -> Result<Vec<SemanticMatchResult>, MatcherError> {
        let prompt = build_prompt(batch);
        let response = self.llm.complete(&prompt).await?;
        debug!(
            provider = self.llm.name(),
            pairs = batch.len(),
            response_len = response.len(),
            "Batch evaluated"
        );
        parse_response(&response, batch.len())
    }
}

#[async_trait]
impl<L: Llm + ?Sized> SemanticMatcher for LlmMatcher<L> {
    fn name(&self) -> &str {
        self.llm.name()
    }

    async fn evaluate(
        &self,
        candidates: &[MatchCandidate],
    ) -> Result<Vec<SemanticMatchResult>, MatcherError> {
        let mut results = Vec::with_capacity(candidates.len());
        for batch in candidates.chunks(self.batch_size) {
            results.extend(self.evaluate_batch(batch).await?);
        }
        Ok(results)
    }
}

/// Builds the matcher selected by configuration.
///
/// # Errors
/// [`MatcherError::MissingApiKey`] when an LLM provider is selected without a key.
pub fn build_matcher(config: &MatcherConfig) -> Result<Arc<dyn SemanticMatcher>, MatcherError> {
    match build_llm(config)? {
        None => {
            info!("No semantic matcher configured; every candidate will be rejected");
            Ok(Arc::new(NoopMatcher))
        }
        Some(llm) => {
            info!(provider = llm.name(), model = %config.model, "Using LLM semantic matcher");
            Ok(Arc::new(
                LlmMatcher::new(llm).with_batch_size(config.max_candidates_per_batch),
            ))
        }
    }
}

fn describe_market(out: &mut String, side: &str, market: &MarketDescriptor) {
    let _ = writeln!(
        out,
        "   {side} [{}] {}: {}",
        market.platform.display_name(),
        market.id,
        market.question
    );
    let _ = writeln!(out, "      Resolves: {}", market.resolution_time.to_rfc3339());
    if let Some(entity) = &market.underlying_entity {
        let _ = writeln!(out, "      Underlying: {entity}");
    }
    if let Some(rules) = &market.settlement_description {
        let _ = writeln!(out, "      Settlement: {rules}");
    }
}

/// Builds the prompt for one batch, labelling pairs `P1..Pn`.
fn build_prompt(batch: &[MatchCandidate]) -> String {
    let mut pairs = String::new();
    for (i, candidate) in batch.iter().enumerate() {
        let _ = writeln!(pairs, "P{}:", i + 1);
        describe_market(&mut pairs, "A", &candidate.a);
        describe_market(&mut pairs, "B", &candidate.b);
    }

    format!(
        r#"Decide whether each pair of prediction markets below resolves on the same real-world event with the same YES outcome definition.

## Pairs
{pairs}
## Output (JSON only)
```json
{{
  "results": [
    {{
      "pair": "P1",
      "same_event": true,
      "same_outcome_semantics": true,
      "confidence": 0.9,
      "risks": ["Settlement sources differ"]
    }}
  ]
}}
```

Rules:
- Use pair IDs exactly as shown (P1, P2, etc)
- Return one entry per pair
- same_outcome_semantics is false if YES on one market can occur while the other resolves NO
- List any differences in strike, timing, or settlement source under risks
"#
    )
}

#[derive(Deserialize)]
struct MatchResponse {
    results: Vec<RawJudgment>,
}

#[derive(Deserialize)]
struct RawJudgment {
    pair: String,
    #[serde(default)]
    same_event: bool,
    #[serde(default)]
    same_outcome_semantics: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    risks: Vec<String>,
}

impl From<RawJudgment> for SemanticMatchResult {
    fn from(raw: RawJudgment) -> Self {
        let confidence = if raw.confidence.is_finite() {
            raw.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            same_event: raw.same_event,
            same_outcome_semantics: raw.same_outcome_semantics,
            confidence,
            risks: raw.risks,
        }
    }
}

/// Parses a reply into exactly `expected` results, in `P1..Pn` order.
fn parse_response(response: &str, expected: usize) -> Result<Vec<SemanticMatchResult>, MatcherError> {
    let json = extract_json(response)?;
    let parsed: MatchResponse = serde_json::from_str(json)
        .map_err(|e| MatcherError::InvalidResponse(format!("invalid JSON: {e}")))?;

    let mut by_label: HashMap<String, RawJudgment> = HashMap::new();
    for judgment in parsed.results {
        let label = judgment.pair.trim().to_ascii_uppercase();
        by_label.entry(label).or_insert(judgment);
    }

    Ok((1..=expected)
        .map(|i| {
            let label = format!("P{i}");
            match by_label.remove(&label) {
                Some(judgment) => judgment.into(),
                None => {
                    warn!(pair = %label, "Model omitted pair from response");
                    SemanticMatchResult::no_match(format!(
                        "Semantic matcher returned no judgment for {label}."
                    ))
                }
            }
        })
        .collect())
}

/// Finds the JSON object in a reply, in a fenced block or between the outer braces.
fn extract_json(text: &str) -> Result<&str, MatcherError> {
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        let end = text[start..]
            .find("```")
            .map_or(text.len(), |i| start + i);
        Ok(text[start..end].trim())
    } else if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end < start {
            return Err(MatcherError::InvalidResponse("no JSON found in response".into()));
        }
        Ok(&text[start..=end])
    } else {
        Err(MatcherError::InvalidResponse("no JSON found in response".into()))
    }
}
