//! Normalization rules shared by every venue.
//!
//! Venue crates map their raw field names onto these helpers so that price
//! scaling, status and binary detection behave identically on both sides.

use crate::error::DataShapeError;
use chrono::{DateTime, NaiveDate, Utc};

/// Status strings that mean a market is open for trading.
const ACTIVE_STATUSES: [&str; 4] = ["trading", "open", "active", "live"];

/// Keyword table for underlying entity extraction: (keywords, canonical name).
const ENTITY_KEYWORDS: &[(&[&str], &str)] = &[
    (&["bitcoin", "btc"], "BTC"),
    (&["ethereum", "eth", "ether"], "ETH"),
    (&["solana", "sol"], "SOL"),
    (&["xrp", "ripple"], "XRP"),
    (&["fomc", "fed", "federal reserve", "fed funds"], "FED"),
    (&["cpi", "inflation"], "CPI"),
    (&["s&p 500", "s&p", "spx"], "SPX"),
    (&["nasdaq", "ndx"], "NDX"),
];

/// Scales a raw price into `[0, 1]`.
///
/// Values above 1 are percentage or cent quotes and are divided by 100.
///
/// # Errors
/// [`DataShapeError::PriceOutOfRange`] if the result is not a finite value in `[0, 1]`.
pub fn scale_price(raw: f64) -> Result<f64, DataShapeError> {
    let scaled = if raw > 1.0 { raw / 100.0 } else { raw };
    if scaled.is_finite() && (0.0..=1.0).contains(&scaled) {
        Ok(scaled)
    } else {
        Err(DataShapeError::PriceOutOfRange(raw))
    }
}

/// Scales both legs and synthesizes a missing one as `1 - known`.
///
/// # Errors
/// [`DataShapeError::MissingPrices`] when neither leg is present, or
/// [`DataShapeError::PriceOutOfRange`] when a present leg cannot be scaled.
pub fn complete_price_legs(
    yes: Option<f64>,
    no: Option<f64>,
) -> Result<(f64, f64), DataShapeError> {
    let yes = yes.map(scale_price).transpose()?;
    let no = no.map(scale_price).transpose()?;

    match (yes, no) {
        (Some(y), Some(n)) => Ok((y, n)),
        (Some(y), None) => Ok((y, 1.0 - y)),
        (None, Some(n)) => Ok((1.0 - n, n)),
        (None, None) => Err(DataShapeError::MissingPrices),
    }
}

/// Midpoint of a two-sided quote, falling back to whichever side exists.
#[must_use]
pub fn mid_or_side(bid: Option<f64>, ask: Option<f64>) -> Option<f64> {
    match (bid, ask) {
        (Some(b), Some(a)) => Some((b + a) / 2.0),
        (Some(b), None) => Some(b),
        (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

/// Active iff not closed, and either the explicit flag or an open status.
#[must_use]
pub fn is_active(closed: bool, active_flag: Option<bool>, status: Option<&str>) -> bool {
    if closed {
        return false;
    }
    match active_flag {
        Some(flag) => flag,
        None => status.is_some_and(|s| {
            let s = s.trim();
            ACTIVE_STATUSES.iter().any(|a| a.eq_ignore_ascii_case(s))
        }),
    }
}

/// Binary iff the type tag is "binary" or there are exactly two outcomes.
#[must_use]
pub fn is_binary(type_tag: Option<&str>, outcome_count: Option<usize>) -> bool {
    type_tag.is_some_and(|t| t.trim().eq_ignore_ascii_case("binary")) || outcome_count == Some(2)
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
///
/// # Errors
/// [`DataShapeError::UnparsableResolutionTime`] if neither form matches.
pub fn parse_resolution_time(raw: Option<&str>) -> Result<DateTime<Utc>, DataShapeError> {
    let unparsable = || DataShapeError::UnparsableResolutionTime(raw.map(str::to_string));
    let text = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(unparsable)?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(unparsable)
}

/// Extracts a canonical underlying entity from free text.
///
/// Keywords match on word boundaries so that "eth" does not fire inside
/// "method".
#[must_use]
pub fn extract_underlying(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    ENTITY_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| contains_word(&lower, k)))
        .map(|(_, name)| (*name).to_string())
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric();
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}

/// Returns the trimmed string, or `None` if it is empty.
#[must_use]
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // ==================== Price Tests ====================

    #[test]
    fn test_scale_price_passthrough_and_percent() {
        assert_eq!(scale_price(0.42).unwrap(), 0.42);
        assert_eq!(scale_price(1.0).unwrap(), 1.0);
        assert_eq!(scale_price(0.0).unwrap(), 0.0);
        assert!((scale_price(42.0).unwrap() - 0.42).abs() < 1e-12);
        assert_eq!(scale_price(100.0).unwrap(), 1.0);
    }

    #[test]
    fn test_scale_price_rejects_out_of_range() {
        assert!(matches!(
            scale_price(250.0),
            Err(DataShapeError::PriceOutOfRange(_))
        ));
        assert!(scale_price(-0.1).is_err());
        assert!(scale_price(f64::NAN).is_err());
        assert!(scale_price(f64::INFINITY).is_err());
    }

    #[test]
    fn test_scaled_prices_always_in_unit_interval() {
        // Grid over negative, fractional, percent and oversized inputs.
        for i in -200..=20_000 {
            let raw = f64::from(i) * 0.05;
            if let Ok(p) = scale_price(raw) {
                assert!((0.0..=1.0).contains(&p), "raw {raw} scaled to {p}");
            }
            for other in [None, Some(0.3), Some(55.0), Some(1000.0)] {
                if let Ok((y, n)) = complete_price_legs(Some(raw), other) {
                    assert!((0.0..=1.0).contains(&y));
                    assert!((0.0..=1.0).contains(&n));
                }
            }
        }
    }

    #[test]
    fn test_complete_price_legs() {
        let (y, n) = complete_price_legs(Some(0.3), None).unwrap();
        assert_eq!(y, 0.3);
        assert!((n - 0.7).abs() < 1e-12);

        let (y, n) = complete_price_legs(None, Some(64.0)).unwrap();
        assert!((y - 0.36).abs() < 1e-12);
        assert!((n - 0.64).abs() < 1e-12);

        let (y, n) = complete_price_legs(Some(0.55), Some(0.48)).unwrap();
        assert_eq!((y, n), (0.55, 0.48));

        assert_eq!(
            complete_price_legs(None, None),
            Err(DataShapeError::MissingPrices)
        );
    }

    #[test]
    fn test_mid_or_side() {
        assert_eq!(mid_or_side(Some(40.0), Some(44.0)), Some(42.0));
        assert_eq!(mid_or_side(None, Some(44.0)), Some(44.0));
        assert_eq!(mid_or_side(Some(40.0), None), Some(40.0));
        assert_eq!(mid_or_side(None, None), None);
    }

    // ==================== Status Tests ====================

    #[test]
    fn test_is_active_prefers_flag() {
        assert!(is_active(false, Some(true), Some("closed")));
        assert!(!is_active(false, Some(false), Some("open")));
    }

    #[test]
    fn test_is_active_falls_back_to_status() {
        for status in ["trading", "open", "ACTIVE", "Live"] {
            assert!(is_active(false, None, Some(status)), "{status}");
        }
        assert!(!is_active(false, None, Some("settled")));
        assert!(!is_active(false, None, None));
    }

    #[test]
    fn test_closed_overrides_everything() {
        assert!(!is_active(true, Some(true), Some("open")));
    }

    #[test]
    fn test_is_binary() {
        assert!(is_binary(Some("binary"), None));
        assert!(is_binary(Some("Binary"), Some(5)));
        assert!(is_binary(None, Some(2)));
        assert!(!is_binary(Some("scalar"), Some(3)));
        assert!(!is_binary(None, None));
    }

    // ==================== Time Tests ====================

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let ts = parse_resolution_time(Some("2026-11-03T20:00:00-05:00")).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 11, 4, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let ts = parse_resolution_time(Some("2026-11-03")).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 11, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_resolution_time(Some("next tuesday")).is_err());
        assert!(parse_resolution_time(Some("")).is_err());
        assert!(parse_resolution_time(None).is_err());
    }

    // ==================== Entity Tests ====================

    #[test]
    fn test_extract_underlying() {
        assert_eq!(
            extract_underlying("Will Bitcoin close above $100k?").as_deref(),
            Some("BTC")
        );
        assert_eq!(
            extract_underlying("ETH above 4000 on Friday?").as_deref(),
            Some("ETH")
        );
        assert_eq!(
            extract_underlying("Will the Fed cut rates in December?").as_deref(),
            Some("FED")
        );
        assert_eq!(extract_underlying("Will it rain in Seattle?"), None);
    }

    #[test]
    fn test_extract_underlying_respects_word_boundaries() {
        assert_eq!(extract_underlying("A new method of voting"), None);
        assert_eq!(extract_underlying("Federalist party wins?"), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  x ".into())).as_deref(), Some("x"));
        assert_eq!(non_empty(Some("   ".into())), None);
        assert_eq!(non_empty(None), None);
    }
}
