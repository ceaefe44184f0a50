//! Wayfarer Common Library
//!
//! Shared code for the Wayfarer services including:
//! - Travel query parsing (entity recognition, fuzzy gazetteer, dates, preferences)
//! - Booking desk
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod booking;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod query;

// Re-export commonly used types
pub use booking::{BookingDesk, FlightBooking, HotelBooking};
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use query::{ParsedQuery, ParserStrategy, QueryParser, QueryParserConfig};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
