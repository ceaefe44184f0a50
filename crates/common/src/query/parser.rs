//! Query Parser - turns one travel utterance into a [`ParsedQuery`]
//!
//! Layered strategy:
//! - Destination: entity candidates → gazetteer, then preposition runs → gazetteer
//! - Dates: natural-language search, then strict ISO scan, then trip length
//! - Preference: first vocabulary keyword, else the default
//!
//! Every stage degrades to a default; `parse` has no error path.

use super::dates::{self, CalendarDateSearch, DateSearch, ReferenceDate};
use super::destination::{self, ResolutionStage};
use super::entities::{EntityRecognizer, HeuristicRecognizer};
use super::gazetteer::Gazetteer;
use super::keyword;
use super::model::{ParsedQuery, TripDates, UNKNOWN_DESTINATION};
use super::preference::PreferenceVocabulary;
use crate::config::{AppConfig, ParserSettings};
use crate::errors::Result;
use crate::metrics;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Which parser design runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserStrategy {
    /// Entity recognition, fuzzy gazetteer, date search and fallbacks
    #[default]
    Layered,
    /// Capitalised-word regex and projected dates; no capabilities needed
    Keyword,
}

impl ParserStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserStrategy::Layered => "layered",
            ParserStrategy::Keyword => "keyword",
        }
    }
}

/// Immutable reference data and defaults shared by every parse
#[derive(Debug, Clone)]
pub struct QueryParserConfig {
    pub strategy: ParserStrategy,

    /// Canonical destinations
    pub gazetteer: Arc<Gazetteer>,

    /// Preference keywords and default
    pub vocabulary: Arc<PreferenceVocabulary>,

    /// Trip length used to derive a missing return date
    pub default_trip_days: u32,

    /// Honour explicit lengths of stay in the text
    pub infer_duration: bool,

    /// Anchor for relative dates
    pub reference: ReferenceDate,
}

impl Default for QueryParserConfig {
    fn default() -> Self {
        Self {
            strategy: ParserStrategy::default(),
            gazetteer: Arc::new(Gazetteer::default()),
            vocabulary: Arc::new(PreferenceVocabulary::default()),
            default_trip_days: 3,
            infer_duration: true,
            reference: ReferenceDate::Today,
        }
    }
}

impl QueryParserConfig {
    /// Build from validated settings
    pub fn from_settings(settings: &ParserSettings) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            strategy: settings.strategy,
            gazetteer: Arc::new(Gazetteer::new(
                settings.gazetteer.iter().cloned(),
                settings.fuzzy_threshold,
            )),
            vocabulary: Arc::new(PreferenceVocabulary::new(
                settings.preferences.iter().cloned(),
                settings.default_preference.clone(),
            )),
            default_trip_days: settings.default_trip_days,
            infer_duration: settings.infer_duration,
            reference: settings.reference()?,
        })
    }

    /// Trip length for `text`: an explicit stay when enabled, else the default
    pub fn trip_days(&self, text: &str) -> u32 {
        if self.infer_duration {
            dates::stay_length(text).unwrap_or(self.default_trip_days)
        } else {
            self.default_trip_days
        }
    }

    /// Gazetteer with a different threshold, keeping entry order
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.gazetteer = Arc::new(Gazetteer::new(self.gazetteer.entries().to_vec(), threshold));
        self
    }
}

/// Query parser for travel booking utterances
pub struct QueryParser {
    config: QueryParserConfig,
    recognizer: Arc<dyn EntityRecognizer>,
    date_search: Arc<dyn DateSearch>,
}

impl QueryParser {
    /// Create a parser with the local heuristic capabilities
    pub fn new(config: QueryParserConfig) -> Self {
        let date_search = Arc::new(CalendarDateSearch::new(config.reference));
        let recognizer = Arc::new(HeuristicRecognizer::with_gazetteer(Arc::clone(&config.gazetteer)));

        Self {
            config,
            recognizer,
            date_search,
        }
    }

    /// Create a parser with the backends named in application config
    pub fn from_app_config(app: &AppConfig) -> Result<Self> {
        let config = QueryParserConfig::from_settings(&app.parser)?;
        let recognizer = super::entities::create_recognizer(&app.entities, &config.gazetteer)?;
        let date_search = dates::create_date_search(&app.dates, config.reference);

        Ok(Self::new(config)
            .with_recognizer(recognizer)
            .with_date_search(date_search))
    }

    /// Replace the entity recognition capability
    pub fn with_recognizer(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Replace the date search capability
    pub fn with_date_search(mut self, date_search: Arc<dyn DateSearch>) -> Self {
        self.date_search = date_search;
        self
    }

    pub fn config(&self) -> &QueryParserConfig {
        &self.config
    }

    pub fn strategy(&self) -> ParserStrategy {
        self.config.strategy
    }

    pub fn recognizer_backend(&self) -> &str {
        self.recognizer.backend_id()
    }

    pub fn date_search_backend(&self) -> &str {
        self.date_search.backend_id()
    }

    /// Parse a query into structured booking intent
    pub async fn parse(&self, text: &str) -> ParsedQuery {
        let start = Instant::now();

        let (query, stage) = match self.config.strategy {
            ParserStrategy::Layered => self.parse_layered(text).await,
            ParserStrategy::Keyword => keyword::parse(text, &self.config),
        };

        metrics::record_parse(
            start.elapsed().as_secs_f64(),
            self.config.strategy.as_str(),
            stage.as_str(),
        );

        tracing::debug!(
            strategy = self.config.strategy.as_str(),
            destination = query.destination(),
            destination_stage = stage.as_str(),
            departure = ?query.departure_date(),
            return_date = ?query.return_date(),
            preference = query.preference(),
            "Query parsed"
        );

        query
    }

    async fn parse_layered(&self, text: &str) -> (ParsedQuery, ResolutionStage) {
        let (destination, stage) = self.resolve_destination(text).await;
        let dates = self.resolve_dates(text).await;
        let preference = self.config.vocabulary.classify(text);

        (ParsedQuery::new(destination, dates, preference), stage)
    }

    async fn resolve_destination(&self, text: &str) -> (String, ResolutionStage) {
        let entities = match self.recognizer.recognize(text).await {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!(
                    backend = self.recognizer.backend_id(),
                    error = %e,
                    "Entity recognition failed, falling back to prepositions"
                );
                metrics::record_capability_failure("entities", self.recognizer.backend_id());
                Vec::new()
            }
        };

        let gazetteer = &self.config.gazetteer;
        if let Some(canonical) = destination::from_entities(gazetteer, &entities) {
            return (canonical.to_string(), ResolutionStage::Entities);
        }
        if let Some(canonical) = destination::from_prepositions(gazetteer, text) {
            return (canonical.to_string(), ResolutionStage::Prepositions);
        }
        (UNKNOWN_DESTINATION.to_string(), ResolutionStage::Unresolved)
    }

    async fn resolve_dates(&self, text: &str) -> TripDates {
        let found: Vec<NaiveDate> = match self.date_search.search(text).await {
            Ok(mentions) => mentions.into_iter().map(|m| m.date).collect(),
            Err(e) => {
                tracing::warn!(
                    backend = self.date_search.backend_id(),
                    error = %e,
                    "Date search failed, falling back to ISO scan"
                );
                metrics::record_capability_failure("dates", self.date_search.backend_id());
                Vec::new()
            }
        };

        let found = if found.is_empty() {
            dates::iso_fallback(text)
        } else {
            found
        };

        TripDates::from_appearance(&found, self.config.trip_days(text))
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new(QueryParserConfig::default())
    }
}

impl std::fmt::Debug for QueryParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryParser")
            .field("strategy", &self.config.strategy)
            .field("gazetteer_entries", &self.config.gazetteer.len())
            .field("recognizer", &self.recognizer.backend_id())
            .field("date_search", &self.date_search.backend_id())
            .finish()
    }
}
