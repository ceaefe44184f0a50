//! Keyword strategy - the regex-only parser design
//!
//! Needs no inference capability at all: the destination is the first
//! capitalised run after `to`/`in`/`for`, dates are projected from the
//! reference date ("weekend" means the coming Saturday, otherwise two
//! days out) and the trip length comes from an "N days" mention.

use super::dates::days_until;
use super::destination::ResolutionStage;
use super::model::{ParsedQuery, TripDates, UNKNOWN_DESTINATION};
use super::parser::QueryParserConfig;
use chrono::{Datelike, Days, Weekday};
use regex_lite::Regex;
use std::sync::LazyLock;

static CAPITALIZED_AFTER_PREPOSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:to|in|for)\s+([A-Z][a-z]+(?:\s[A-Z][a-z]+)*)").expect("destination pattern")
});

static DAY_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,3})\s*(?:days|day)\b").expect("day count pattern")
});

/// Days between the reference date and departure when no weekend is asked for
const LEAD_DAYS: u64 = 2;

pub(crate) fn parse(text: &str, config: &QueryParserConfig) -> (ParsedQuery, ResolutionStage) {
    let (destination, stage) = CAPITALIZED_AFTER_PREPOSITION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|run| config.gazetteer.closest(run.as_str()))
        .map(|canonical| (canonical.to_string(), ResolutionStage::Prepositions))
        .unwrap_or_else(|| (UNKNOWN_DESTINATION.to_string(), ResolutionStage::Unresolved));

    let lowered = text.to_lowercase();
    let trip_days = DAY_COUNT
        .captures(&lowered)
        .and_then(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .unwrap_or(config.default_trip_days);

    let today = config.reference.resolve();
    let lead = if lowered.contains("weekend") {
        days_until(today.weekday(), Weekday::Sat)
    } else {
        LEAD_DAYS
    };
    let departure = today.checked_add_days(Days::new(lead));
    let return_date = departure.and_then(|d| d.checked_add_days(Days::new(u64::from(trip_days))));

    let query = ParsedQuery::new(
        destination,
        TripDates {
            departure,
            return_date,
        },
        config.vocabulary.classify(text),
    );
    (query, stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::dates::ReferenceDate;
    use crate::query::ParserStrategy;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-06-04 is a Wednesday
    fn config() -> QueryParserConfig {
        QueryParserConfig {
            strategy: ParserStrategy::Keyword,
            reference: ReferenceDate::Fixed(date(2025, 6, 4)),
            ..QueryParserConfig::default()
        }
    }

    #[test]
    fn test_capitalised_destination_and_lead_days() {
        let (query, stage) = parse("I need a hotel in Goa for 5 days near a lake", &config());
        assert_eq!(query.destination(), "Goa");
        assert_eq!(stage, ResolutionStage::Prepositions);
        assert_eq!(query.departure_date(), Some(date(2025, 6, 6)));
        assert_eq!(query.return_date(), Some(date(2025, 6, 11)));
        assert_eq!(query.preference(), "lake");
    }

    #[test]
    fn test_weekend_departs_saturday() {
        let (query, _) = parse("weekend trip to New York", &config());
        assert_eq!(query.destination(), "New York");
        assert_eq!(query.departure_date(), Some(date(2025, 6, 7)));
        assert_eq!(query.return_date(), Some(date(2025, 6, 10)));
    }

    #[test]
    fn test_lowercase_destination_is_unknown() {
        let (query, stage) = parse("fly to paris", &config());
        assert_eq!(query.destination(), UNKNOWN_DESTINATION);
        assert_eq!(stage, ResolutionStage::Unresolved);
        assert_eq!(query.preference(), "beach");
    }

    #[test]
    fn test_oversized_day_count_uses_default_length() {
        let (query, _) = parse("trip to Goa for 4000000000 days", &config());
        assert_eq!(query.departure_date(), Some(date(2025, 6, 6)));
        assert_eq!(query.return_date(), Some(date(2025, 6, 9)));

        let (query, _) = parse("trip to Goa for 999 days", &config());
        assert_eq!(query.return_date(), Some(date(2028, 3, 1)));
    }

    #[test]
    fn test_unlisted_capitalised_place_is_unknown() {
        let (query, _) = parse("take me to Atlantis", &config());
        assert!(query.is_destination_unknown());
    }
}
