//! Polymarket Gamma API models.
//!
//! Gamma encodes `outcomes` and `outcomePrices` as JSON strings holding an
//! array (`"[\"Yes\", \"No\"]"`); some deployments send plain arrays. Both
//! forms are accepted.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Raw market record from `GET /markets`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGammaMarket {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub condition_id: Option<String>,
    pub question: Option<String>,
    pub description: Option<String>,
    pub end_date: Option<String>,
    pub end_date_iso: Option<String>,
    pub active: Option<bool>,
    pub closed: Option<bool>,
    pub archived: Option<bool>,
    pub market_type: Option<String>,
    #[serde(default, deserialize_with = "encoded_list")]
    pub outcomes: Option<Vec<String>>,
    #[serde(default, deserialize_with = "encoded_list")]
    pub outcome_prices: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub best_bid: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub best_ask: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_trade_price: Option<f64>,
}

impl RawGammaMarket {
    /// Market identifier, preferring the Gamma id over the condition id.
    #[must_use]
    pub fn market_id(&self) -> Option<&str> {
        let present = |s: &&str| !s.trim().is_empty();
        self.id
            .as_deref()
            .filter(present)
            .or_else(|| self.condition_id.as_deref().filter(present))
    }

    /// Number of outcomes, if the outcome list was present.
    #[must_use]
    pub fn outcome_count(&self) -> Option<usize> {
        self.outcomes.as_ref().map(Vec::len)
    }

    /// Price listed for the outcome named `label`, else the one at `fallback_index`.
    #[must_use]
    pub fn outcome_price(&self, label: &str, fallback_index: usize) -> Option<f64> {
        let prices = self.outcome_prices.as_ref()?;
        let index = self
            .outcomes
            .as_ref()
            .and_then(|names| names.iter().position(|n| n.trim().eq_ignore_ascii_case(label)))
            .unwrap_or(fallback_index);
        prices.get(index).and_then(|p| p.trim().parse::<f64>().ok())
    }

    /// Returns true if the market is flagged closed or archived.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.unwrap_or(false) || self.archived.unwrap_or(false)
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts a string or a number.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_string))
}

/// Accepts a number or a numeric string; anything else is treated as absent.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accepts an array or a JSON-encoded array string.
fn encoded_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        Some(Value::String(s)) => match serde_json::from_str::<Vec<Value>>(&s) {
            Ok(items) => items,
            Err(_) => return Ok(None),
        },
        _ => return Ok(None),
    };
    Ok(Some(items.into_iter().filter_map(value_to_string).collect()))
}
