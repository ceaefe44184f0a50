//! Booking handlers: parse the utterance, then book

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate;
use crate::AppState;
use wayfarer_common::{errors::Result, FlightBooking, HotelBooking, ParsedQuery};

/// Booking request carrying a free-text travel query
#[derive(Debug, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(length(max = 4000))]
    pub query: String,
}

/// What was understood, what was booked, and the confirmation line
#[derive(Serialize)]
pub struct BookingResponse<B> {
    pub parsed: ParsedQuery,
    pub booking: B,
    pub summary: String,
}

/// Book a flight for the parsed query
pub async fn book_flight(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<BookingResponse<FlightBooking>>> {
    validate(&request)?;

    let parsed = state.parser.parse(&request.query).await;
    let booking = state.desk.book_flight(&parsed);

    Ok(Json(BookingResponse {
        summary: booking.to_string(),
        parsed,
        booking,
    }))
}

/// Book a hotel for the parsed query
pub async fn book_hotel(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<BookingResponse<HotelBooking>>> {
    validate(&request)?;

    let parsed = state.parser.parse(&request.query).await;
    let booking = state.desk.book_hotel(&parsed);

    Ok(Json(BookingResponse {
        summary: booking.to_string(),
        parsed,
        booking,
    }))
}
