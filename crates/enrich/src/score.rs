// Reply parsing and score normalization.
//
// The model's reply is untrusted text. It is parsed into a RawScore whose
// fields are all optional, then normalized into a StoreRating that always
// carries concrete values.

use serde::Serialize;
use serde_json::{Map, Value};

pub const REASON_MAX_CHARS: usize = 240;
pub const NO_REASON: &str = "No AI reason provided";
pub const UNAVAILABLE_REASON: &str = "AI rating unavailable";

const HEALTH_MAX: u8 = 10;
const HEALTH_DEFAULT: u8 = 5;
const ECONOMY_MAX: u8 = 5;
const ECONOMY_DEFAULT: u8 = 3;

/// Store description sent to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorePayload {
    pub name: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub county: String,
    #[serde(rename = "storeType")]
    pub store_type: String,
}

/// Scores as the model returned them. Missing or non-numeric values are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawScore {
    pub health: Option<f64>,
    pub health_reason: Option<String>,
    pub economy: Option<f64>,
    pub economy_reason: Option<String>,
}

impl RawScore {
    /// Parse reply content. Falls back to the outermost `{...}` span when the
    /// content carries extra text; `None` when no JSON object can be recovered.
    pub fn from_reply(content: &str) -> Option<Self> {
        let object = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(map)) => map,
            _ => {
                let start = content.find('{')?;
                let end = content.rfind('}')?;
                if end < start {
                    return None;
                }
                match serde_json::from_str::<Value>(&content[start..=end]) {
                    Ok(Value::Object(map)) => map,
                    _ => return None,
                }
            }
        };
        Some(Self::from_object(&object))
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            health: number(object.get("score")),
            health_reason: text(object.get("reason")),
            economy: number(object.get("economy_score")),
            economy_reason: text(object.get("economy_reason")),
        }
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// How a row's rating was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingOutcome {
    /// Both scores came from the model.
    Scored,
    /// The call succeeded but at least one score was missing.
    Defaulted,
    /// The call failed.
    Unavailable,
}

/// Final per-row values written to the table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRating {
    pub health_score: u8,
    pub health_reason: String,
    pub economy_score: u8,
    pub economy_reason: String,
    pub outcome: RatingOutcome,
}

impl StoreRating {
    /// Normalize a reply. Healthy stores get `bonus` added to the health score
    /// before rounding and clamping.
    pub fn normalize(raw: &RawScore, is_healthy: bool, bonus: f64) -> Self {
        let (health_score, health_reason) = match raw.health {
            Some(score) => {
                let score = if is_healthy { score + bonus } else { score };
                (
                    clamp_score(score, HEALTH_MAX),
                    truncate_reason(raw.health_reason.as_deref().unwrap_or_default()),
                )
            }
            None => (HEALTH_DEFAULT, NO_REASON.to_string()),
        };

        let (economy_score, economy_reason) = match raw.economy {
            Some(score) => (
                clamp_score(score, ECONOMY_MAX),
                truncate_reason(raw.economy_reason.as_deref().unwrap_or_default()),
            ),
            None => (ECONOMY_DEFAULT, NO_REASON.to_string()),
        };

        let outcome = if raw.health.is_some() && raw.economy.is_some() {
            RatingOutcome::Scored
        } else {
            RatingOutcome::Defaulted
        };

        Self {
            health_score,
            health_reason,
            economy_score,
            economy_reason,
            outcome,
        }
    }

    /// Neutral rating for a failed call.
    pub fn unavailable() -> Self {
        Self {
            health_score: HEALTH_DEFAULT,
            health_reason: UNAVAILABLE_REASON.to_string(),
            economy_score: ECONOMY_DEFAULT,
            economy_reason: UNAVAILABLE_REASON.to_string(),
            outcome: RatingOutcome::Unavailable,
        }
    }
}

fn clamp_score(score: f64, max: u8) -> u8 {
    score.round_ties_even().clamp(1.0, f64::from(max)) as u8
}

fn truncate_reason(reason: &str) -> String {
    reason.chars().take(REASON_MAX_CHARS).collect()
}
