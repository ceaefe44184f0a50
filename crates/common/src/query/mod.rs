//! Travel query understanding
//!
//! - `model` - the [`ParsedQuery`] value
//! - `gazetteer` - canonical destinations and fuzzy lookup
//! - `entities` - entity recognition backends
//! - `dates` - date search backends and the ISO fallback
//! - `preference` - preference vocabulary
//! - `destination` - entity and preposition destination stages
//! - `parser` - the orchestrating [`QueryParser`]
//! - `structured` - intent read from language-model JSON

pub mod dates;
pub mod destination;
pub mod entities;
pub mod gazetteer;
mod keyword;
pub mod model;
pub mod parser;
pub mod preference;
pub mod structured;

pub use dates::{CalendarDateSearch, DateMention, DateSearch, ReferenceDate};
pub use entities::{EntityLabel, EntityRecognizer, HeuristicRecognizer, RecognizedEntity};
pub use gazetteer::Gazetteer;
pub use model::{ParsedQuery, TripDates, UNKNOWN_DESTINATION};
pub use parser::{ParserStrategy, QueryParser, QueryParserConfig};
pub use preference::PreferenceVocabulary;
