//! API handlers module

pub mod bookings;
pub mod health;
pub mod parse;

use validator::Validate;
use wayfarer_common::errors::{AppError, Result};

/// Longest utterance accepted by the API, in characters
pub const MAX_TEXT_CHARS: u64 = 4000;

/// Run `validator` rules and map failures to a 400
pub(crate) fn validate<T: Validate>(request: &T) -> Result<()> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: e.field_errors().keys().next().map(|field| field.to_string()),
    })
}
