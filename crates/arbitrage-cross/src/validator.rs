//! Deterministic re-check of semantic matcher judgments.

use chrono::Duration;
use edge_scan_core::{MarketPair, SemanticMatchResult, ValidatedMatch};

/// Issue recorded when the two resolution times are too far apart.
pub const RESOLUTION_MISMATCH: &str = "Resolution times differ beyond allowed threshold.";

/// Issue recorded when the matcher did not confirm both semantic flags.
pub const SEMANTICS_UNCONFIRMED: &str =
    "Semantic matcher did not confirm same event/outcome semantics.";

/// Validates one pair against its matcher judgment.
///
/// Confidence is not consulted: a pair the matcher did not confirm fails
/// regardless of how sure it was.
#[must_use]
pub fn validate_one(
    pair: &MarketPair,
    result: &SemanticMatchResult,
    max_resolution_delta: Duration,
) -> ValidatedMatch {
    let mut issues = Vec::new();

    if pair.resolution_delta() > max_resolution_delta {
        issues.push(RESOLUTION_MISMATCH.to_string());
    }
    if !result.is_confirmed() {
        issues.push(SEMANTICS_UNCONFIRMED.to_string());
    }
    // Strike and settlement-rule comparison is not implemented yet.

    ValidatedMatch {
        pair: pair.clone(),
        match_result: result.clone(),
        passed: issues.is_empty(),
        issues,
    }
}

/// Validates pairs against their judgments, index by index.
///
/// Callers check that both slices have the same length; any excess on
/// either side is ignored.
#[must_use]
pub fn validate(
    pairs: &[MarketPair],
    results: &[SemanticMatchResult],
    max_resolution_delta: Duration,
) -> Vec<ValidatedMatch> {
    pairs
        .iter()
        .zip(results)
        .map(|(pair, result)| validate_one(pair, result, max_resolution_delta))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{confirmed, market_at};
    use edge_scan_core::Platform;

    fn pair(hours_apart: i64) -> MarketPair {
        MarketPair::new(
            market_at(Platform::Kalshi, "A", 0.40, 0),
            market_at(Platform::Polymarket, "B", 0.55, hours_apart),
        )
    }

    // ==================== Pass Tests ====================

    #[test]
    fn test_confirmed_match_within_window_passes() {
        let validated = validate(&[pair(2)], &[confirmed(0.9)], Duration::hours(24));

        assert_eq!(validated.len(), 1);
        assert!(validated[0].passed);
        assert!(validated[0].issues.is_empty());
    }

    // ==================== Failure Tests ====================

    #[test]
    fn test_unconfirmed_fails_at_any_confidence() {
        for (same_event, same_outcome) in [(false, true), (true, false), (false, false)] {
            for confidence in [0.0, 0.5, 0.99, 1.0] {
                let result = SemanticMatchResult {
                    same_event,
                    same_outcome_semantics: same_outcome,
                    confidence,
                    risks: vec![],
                };
                let validated = validate_one(&pair(0), &result, Duration::hours(24));

                assert!(!validated.passed);
                assert_eq!(validated.issues, vec![SEMANTICS_UNCONFIRMED.to_string()]);
            }
        }
    }

    #[test]
    fn test_resolution_gap_fails() {
        let validated = validate_one(&pair(30), &confirmed(1.0), Duration::hours(24));
        assert!(!validated.passed);
        assert_eq!(validated.issues, vec![RESOLUTION_MISMATCH.to_string()]);
    }

    #[test]
    fn test_issue_order() {
        let result = SemanticMatchResult::no_match("unclear");
        let validated = validate_one(&pair(30), &result, Duration::hours(24));

        assert_eq!(
            validated.issues,
            vec![
                RESOLUTION_MISMATCH.to_string(),
                SEMANTICS_UNCONFIRMED.to_string()
            ]
        );
        assert_eq!(validated.match_result, result);
    }

    #[test]
    fn test_pairs_by_index() {
        let validated = validate(
            &[pair(0), pair(1)],
            &[confirmed(0.8), SemanticMatchResult::no_match("x")],
            Duration::hours(24),
        );

        assert!(validated[0].passed);
        assert!(!validated[1].passed);
        assert_eq!(validated[1].pair.market_b.resolution_time, pair(1).market_b.resolution_time);
    }
}
