//! Booking desk
//!
//! Reference collaborator that turns a [`ParsedQuery`] into flight and
//! hotel confirmations. No inventory is consulted: every request is
//! confirmed with a fresh random code.

use crate::config::BookingConfig;
use crate::metrics;
use crate::query::ParsedQuery;
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Range of the numeric part of confirmation codes
const CODE_RANGE: std::ops::RangeInclusive<u32> = 100_000..=999_999;

/// Flight confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightBooking {
    pub pnr: String,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub destination: String,
}

impl fmt::Display for FlightBooking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Flight booked with PNR: {}, from {} to {} to {}.",
            self.pnr,
            DateOrUnspecified(self.departure_date),
            DateOrUnspecified(self.return_date),
            self.destination
        )
    }
}

/// Hotel confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelBooking {
    pub booking_id: String,
    pub hotel_name: String,
    pub location: String,
    pub checkin: Option<NaiveDate>,
    pub checkout: Option<NaiveDate>,
}

impl fmt::Display for HotelBooking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hotel booked with ID: {}, Hotel: {} located {}, from {} to {}.",
            self.booking_id,
            self.hotel_name,
            self.location,
            DateOrUnspecified(self.checkin),
            DateOrUnspecified(self.checkout)
        )
    }
}

struct DateOrUnspecified(Option<NaiveDate>);

impl fmt::Display for DateOrUnspecified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => f.write_str("unspecified"),
        }
    }
}

/// Issues confirmations for parsed queries
#[derive(Debug, Clone)]
pub struct BookingDesk {
    config: BookingConfig,
}

impl BookingDesk {
    pub fn new(config: BookingConfig) -> Self {
        Self { config }
    }

    /// Book a round-trip flight. Unknown destinations and absent dates
    /// are confirmed as-is.
    pub fn book_flight(&self, query: &ParsedQuery) -> FlightBooking {
        let booking = FlightBooking {
            pnr: confirmation_code(&self.config.flight_prefix),
            departure_date: query.departure_date(),
            return_date: query.return_date(),
            destination: query.destination().to_string(),
        };

        metrics::record_booking("flight");
        tracing::info!(
            pnr = %booking.pnr,
            destination = %booking.destination,
            "Flight booked"
        );
        booking
    }

    /// Book a hotel near the preferred kind of place
    pub fn book_hotel(&self, query: &ParsedQuery) -> HotelBooking {
        let booking = HotelBooking {
            booking_id: confirmation_code(&self.config.hotel_prefix),
            hotel_name: self.config.hotel_name.clone(),
            location: format!("Near {}", capitalize(query.preference())),
            checkin: query.departure_date(),
            checkout: query.return_date(),
        };

        metrics::record_booking("hotel");
        tracing::info!(
            booking_id = %booking.booking_id,
            hotel = %booking.hotel_name,
            "Hotel booked"
        );
        booking
    }
}

impl Default for BookingDesk {
    fn default() -> Self {
        Self::new(BookingConfig::default())
    }
}

fn confirmation_code(prefix: &str) -> String {
    format!("{}{}", prefix, rand::thread_rng().gen_range(CODE_RANGE))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TripDates;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn paris() -> ParsedQuery {
        ParsedQuery::new(
            "Paris",
            TripDates {
                departure: Some(date(2025, 6, 4)),
                return_date: Some(date(2025, 6, 7)),
            },
            "mountain",
        )
    }

    fn assert_code(code: &str, prefix: &str) {
        let digits = code.strip_prefix(prefix).expect("prefix");
        let number: u32 = digits.parse().expect("numeric suffix");
        assert!(CODE_RANGE.contains(&number));
        assert_eq!(digits.len(), 6);
    }

    #[test]
    fn test_flight_booking() {
        let booking = BookingDesk::default().book_flight(&paris());
        assert_code(&booking.pnr, "PNR");
        assert_eq!(booking.destination, "Paris");
        assert_eq!(
            booking.to_string(),
            format!("Flight booked with PNR: {}, from 2025-06-04 to 2025-06-07 to Paris.", booking.pnr)
        );
    }

    #[test]
    fn test_hotel_booking() {
        let booking = BookingDesk::default().book_hotel(&paris());
        assert_code(&booking.booking_id, "HTL");
        assert_eq!(booking.hotel_name, "Sea Breeze Resort");
        assert_eq!(booking.location, "Near Mountain");
        assert_eq!(
            booking.to_string(),
            format!(
                "Hotel booked with ID: {}, Hotel: Sea Breeze Resort located Near Mountain, from 2025-06-04 to 2025-06-07.",
                booking.booking_id
            )
        );
    }

    #[test]
    fn test_unknown_destination_and_missing_dates_accepted() {
        let query = ParsedQuery::new("Unknown", TripDates::none(), "beach");
        let flight = BookingDesk::default().book_flight(&query);
        assert!(flight.to_string().ends_with("from unspecified to unspecified to Unknown."));

        let desk = BookingDesk::new(BookingConfig {
            hotel_name: "Harbour Inn".to_string(),
            flight_prefix: "FL".to_string(),
            hotel_prefix: "HX".to_string(),
        });
        let hotel = desk.book_hotel(&query);
        assert_code(&hotel.booking_id, "HX");
        assert_eq!(hotel.location, "Near Beach");
        assert_eq!(hotel.checkin, None);
    }
}
