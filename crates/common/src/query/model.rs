//! The structured booking intent produced by the parser

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Destination reported when no gazetteer entry could be resolved
pub const UNKNOWN_DESTINATION: &str = "Unknown";

/// Structured travel intent extracted from one utterance.
///
/// Fields are private: a `ParsedQuery` is only built by the parser
/// (or the structured-output reader) and is never mutated afterwards.
/// Dates serialize as ISO `YYYY-MM-DD`, absent dates as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedQuery {
    destination: String,
    departure_date: Option<NaiveDate>,
    return_date: Option<NaiveDate>,
    preference: String,
}

impl ParsedQuery {
    pub(crate) fn new(
        destination: impl Into<String>,
        dates: TripDates,
        preference: impl Into<String>,
    ) -> Self {
        Self {
            destination: destination.into(),
            departure_date: dates.departure,
            return_date: dates.return_date,
            preference: preference.into(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// True when the destination is the `"Unknown"` sentinel
    pub fn is_destination_unknown(&self) -> bool {
        self.destination == UNKNOWN_DESTINATION
    }

    pub fn departure_date(&self) -> Option<NaiveDate> {
        self.departure_date
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    pub fn preference(&self) -> &str {
        &self.preference
    }
}

/// Departure and return dates resolved from text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TripDates {
    pub departure: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
}

impl TripDates {
    /// No date signal anywhere in the text
    pub fn none() -> Self {
        Self::default()
    }

    /// Assign dates by order of appearance.
    ///
    /// Two or more dates: first is departure, second is return (not sorted).
    /// One date: return is derived by adding `trip_days`.
    pub fn from_appearance(dates: &[NaiveDate], trip_days: u32) -> Self {
        match dates {
            [] => Self::none(),
            [departure] => Self {
                departure: Some(*departure),
                return_date: departure.checked_add_days(chrono::Days::new(u64::from(trip_days))),
            },
            [departure, return_date, ..] => Self {
                departure: Some(*departure),
                return_date: Some(*return_date),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.departure.is_none() && self.return_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_date_derives_return() {
        let dates = TripDates::from_appearance(&[date(2025, 6, 4)], 3);
        assert_eq!(dates.departure, Some(date(2025, 6, 4)));
        assert_eq!(dates.return_date, Some(date(2025, 6, 7)));
    }

    #[test]
    fn test_two_dates_keep_appearance_order() {
        let dates = TripDates::from_appearance(&[date(2025, 6, 9), date(2025, 6, 4)], 3);
        assert_eq!(dates.departure, Some(date(2025, 6, 9)));
        assert_eq!(dates.return_date, Some(date(2025, 6, 4)));
    }

    #[test]
    fn test_extra_dates_ignored() {
        let dates = TripDates::from_appearance(
            &[date(2025, 1, 1), date(2025, 1, 5), date(2025, 2, 1)],
            3,
        );
        assert_eq!(dates.return_date, Some(date(2025, 1, 5)));
    }

    #[test]
    fn test_serializes_iso_and_null() {
        let query = ParsedQuery::new(
            UNKNOWN_DESTINATION,
            TripDates {
                departure: Some(date(2025, 6, 4)),
                return_date: None,
            },
            "beach",
        );
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["destination"], "Unknown");
        assert_eq!(json["departure_date"], "2025-06-04");
        assert!(json["return_date"].is_null());
        assert_eq!(json["preference"], "beach");
        assert!(query.is_destination_unknown());
    }
}
