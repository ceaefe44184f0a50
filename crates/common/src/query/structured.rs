//! Reader for intent emitted by a language model as JSON.
//!
//! The completion is free text that should contain one object such as
//! `{"destination": "Paris", "departure_date": "2025-06-04",
//! "return_date": "2025-06-07", "preferences": "beach"}`. Everything in it
//! is untrusted: values are checked against the same reference data the
//! parser uses, and anything unusable falls back to the parser defaults.

use super::model::{ParsedQuery, TripDates, UNKNOWN_DESTINATION};
use super::parser::QueryParserConfig;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Build a [`ParsedQuery`] from a model completion.
///
/// Valid dates go through the same 0/1/2 rule as parsed text: a lone
/// valid date becomes the departure, whichever key carried it, and the
/// return is derived from it.
pub fn from_model_output(text: &str, config: &QueryParserConfig) -> ParsedQuery {
    let Some(fields) = extract_object(text) else {
        tracing::debug!("No JSON object in model output, using defaults");
        return ParsedQuery::new(
            UNKNOWN_DESTINATION,
            TripDates::none(),
            config.vocabulary.default_preference(),
        );
    };

    let destination = fields
        .get("destination")
        .and_then(Value::as_str)
        .and_then(|name| config.gazetteer.closest(name))
        .unwrap_or(UNKNOWN_DESTINATION);

    let dates: Vec<NaiveDate> = ["departure_date", "return_date"]
        .iter()
        .filter_map(|key| fields.get(*key)?.as_str())
        .filter_map(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
        .collect();

    let preference = fields
        .get("preferences")
        .or_else(|| fields.get("preference"))
        .and_then(|value| preference_from(value, config))
        .unwrap_or_else(|| config.vocabulary.default_preference());

    ParsedQuery::new(
        destination,
        TripDates::from_appearance(&dates, config.default_trip_days),
        preference,
    )
}

/// Outermost `{...}` span, parsed as a JSON object
fn extract_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(fields)) => Some(fields),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Model output is not valid JSON");
            None
        }
    }
}

/// A string or the first recognised entry of a list
fn preference_from<'c>(value: &Value, config: &'c QueryParserConfig) -> Option<&'c str> {
    match value {
        Value::String(raw) => keyword(raw, config),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .find_map(|raw| keyword(raw, config)),
        _ => None,
    }
}

fn keyword<'c>(raw: &str, config: &'c QueryParserConfig) -> Option<&'c str> {
    let raw = raw.trim().to_lowercase();
    config
        .vocabulary
        .keywords()
        .iter()
        .find(|keyword| **keyword == raw)
        .map(String::as_str)
}
