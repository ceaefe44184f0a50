//! Entity recognition backends
//!
//! The parser only needs `(span, label)` pairs and keeps the geo-political
//! ones. Backends:
//! - `HeuristicRecognizer` - local capitalisation-based recogniser
//! - `RemoteRecognizer` - HTTP client for an external NER service
//! - `DisabledRecognizer` - reports the capability as unavailable

use super::gazetteer::Gazetteer;
use crate::config::{EntityConfig, EntityProvider};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Coarse entity classes, modelled on common NER tag sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    /// Geo-political entity: countries, cities, states
    Gpe,
    /// Non-GPE location: mountain ranges, bodies of water
    Location,
    Person,
    Organization,
    Date,
    Other(String),
}

impl EntityLabel {
    /// Map a tag as emitted by common NER models (`GPE`, `LOC`, `PER`...)
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "GPE" => EntityLabel::Gpe,
            "LOC" | "LOCATION" => EntityLabel::Location,
            "PER" | "PERSON" => EntityLabel::Person,
            "ORG" | "ORGANIZATION" => EntityLabel::Organization,
            "DATE" => EntityLabel::Date,
            _ => EntityLabel::Other(tag.trim().to_string()),
        }
    }
}

/// A recognised span and its label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    pub text: String,
    pub label: EntityLabel,
}

impl RecognizedEntity {
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }

    pub fn is_geopolitical(&self) -> bool {
        self.label == EntityLabel::Gpe
    }
}

/// Trait for entity recognition capabilities
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Recognise entities in `text`, in order of appearance
    async fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>>;

    /// Human-readable backend identifier
    fn backend_id(&self) -> &str;
}

// ============================================================================
// HeuristicRecognizer
// ============================================================================

// Words that open a capitalised run without being part of a name
const SENTENCE_STARTERS: &[&str] = &[
    "a", "an", "the", "this", "that", "i", "we", "you", "my", "our", "me", "us",
    "and", "but", "or", "so", "if", "then", "please", "hi", "hello", "hey",
    "to", "in", "at", "for", "from", "on", "with", "by", "of", "near",
    "book", "booking", "travel", "trip", "want", "need", "plan", "planning",
    "fly", "flight", "flights", "hotel", "hotels", "go", "going", "visit",
    "find", "get", "can", "could", "would", "will", "is", "are", "what",
    "where", "when", "how", "today", "tomorrow", "yesterday", "next", "last",
    "prefer", "dates", "date",
];

// Lowercase words allowed inside a multi-word place name
const NAME_CONNECTORS: &[&str] = &["de", "da", "del", "do", "dos", "la", "le", "of", "van", "von"];

const HONORIFICS: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "sir", "madam"];

const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "ltd", "llc", "co", "plc", "airlines", "airways", "air",
    "hotel", "hotels", "resort", "resorts", "bank", "group", "university",
];

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august",
    "september", "october", "november", "december", "jan", "feb", "mar", "apr",
    "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

/// Capitalisation-based recogniser.
///
/// Groups consecutive capitalised words into runs, cuts runs at
/// punctuation, strips leading filler words and labels what is left.
/// Anything that is not obviously a date, person or organisation is
/// reported as geo-political; the gazetteer does the real filtering.
///
/// A lone word that opens a sentence is capitalised by grammar alone, so
/// it is only reported when it names a gazetteer entry exactly.
#[derive(Debug, Clone, Default)]
pub struct HeuristicRecognizer {
    lexicon: Option<Arc<Gazetteer>>,
}

/// One whitespace-delimited word with its surrounding punctuation noted
struct Token<'a> {
    word: &'a str,
    breaks_before: bool,
    breaks_after: bool,
    ends_sentence: bool,
}

impl<'a> Token<'a> {
    fn from_raw(raw: &'a str) -> Self {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        let (lead, trail) = match raw.find(word) {
            Some(start) if !word.is_empty() => (&raw[..start], &raw[start + word.len()..]),
            _ => (raw, ""),
        };

        Self {
            word,
            breaks_before: !lead.is_empty(),
            breaks_after: !trail.is_empty(),
            ends_sentence: raw.contains(['.', '!', '?']),
        }
    }

    fn is_capitalized(&self) -> bool {
        self.word.chars().next().map_or(false, |c| c.is_uppercase())
    }
}

/// Capitalised words collected since the last break
#[derive(Default)]
struct Run<'a> {
    words: Vec<&'a str>,
    preceding: Option<&'a str>,
    sentence_start: bool,
}

impl HeuristicRecognizer {
    /// Recogniser without a lexicon: sentence-initial single words are dropped
    pub fn new() -> Self {
        Self::default()
    }

    /// Recogniser that keeps sentence-initial single words naming a known place
    pub fn with_gazetteer(gazetteer: Arc<Gazetteer>) -> Self {
        Self {
            lexicon: Some(gazetteer),
        }
    }

    /// Synchronous core of the recogniser
    pub fn extract(&self, text: &str) -> Vec<RecognizedEntity> {
        let tokens: Vec<Token<'_>> = text.split_whitespace().map(Token::from_raw).collect();

        let mut entities = Vec::new();
        let mut run = Run::default();

        for (i, token) in tokens.iter().enumerate() {
            if token.breaks_before {
                self.flush(&mut run, &mut entities);
            }

            if token.word.is_empty() {
                self.flush(&mut run, &mut entities);
            } else if token.is_capitalized() {
                if run.words.is_empty() {
                    let previous = i.checked_sub(1).map(|prev| &tokens[prev]);
                    run.preceding = previous.map(|prev| prev.word);
                    run.sentence_start = previous.map_or(true, |prev| prev.ends_sentence);
                }
                run.words.push(token.word);
            } else if !run.words.is_empty()
                && !token.breaks_after
                && NAME_CONNECTORS.contains(&token.word)
                && tokens.get(i + 1).map_or(false, |next| next.is_capitalized() && !next.breaks_before)
            {
                run.words.push(token.word);
            } else {
                self.flush(&mut run, &mut entities);
            }

            if token.breaks_after || token.ends_sentence {
                self.flush(&mut run, &mut entities);
            }
        }
        self.flush(&mut run, &mut entities);

        entities
    }

    fn flush(&self, run: &mut Run<'_>, entities: &mut Vec<RecognizedEntity>) {
        if run.words.is_empty() {
            return;
        }

        let mut words: &[&str] = &run.words;
        let mut stripped = false;
        let mut honorific = run
            .preceding
            .map(|word| HONORIFICS.contains(&word.to_lowercase().as_str()))
            .unwrap_or(false);

        while let Some((first, rest)) = words.split_first() {
            let lower = first.to_lowercase();
            if HONORIFICS.contains(&lower.as_str()) {
                honorific = true;
            } else if !SENTENCE_STARTERS.contains(&lower.as_str()) {
                break;
            }
            words = rest;
            stripped = true;
        }
        while let Some((last, rest)) = words.split_last() {
            if !NAME_CONNECTORS.contains(last) {
                break;
            }
            words = rest;
        }

        if let Some(last) = words.last() {
            let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
            let label = if lowered
                .iter()
                .all(|w| MONTHS.contains(&w.as_str()) || WEEKDAYS.contains(&w.as_str()))
            {
                EntityLabel::Date
            } else if honorific {
                EntityLabel::Person
            } else if ORG_SUFFIXES.contains(&last.to_lowercase().as_str()) && words.len() > 1 {
                EntityLabel::Organization
            } else {
                EntityLabel::Gpe
            };

            let opens_sentence = run.sentence_start && !stripped && words.len() == 1;
            if label == EntityLabel::Gpe && opens_sentence && !self.is_known_place(last) {
                tracing::trace!(word = *last, "Sentence-initial word is not a known place");
            } else {
                entities.push(RecognizedEntity::new(words.join(" "), label));
            }
        }

        run.words.clear();
    }

    fn is_known_place(&self, word: &str) -> bool {
        self.lexicon
            .as_ref()
            .map_or(false, |gazetteer| gazetteer.lookup(word).is_some())
    }
}

#[async_trait]
impl EntityRecognizer for HeuristicRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        Ok(self.extract(text))
    }

    fn backend_id(&self) -> &str {
        "heuristic"
    }
}

// ============================================================================
// RemoteRecognizer
// ============================================================================

/// Client for an external NER service.
///
/// Posts `{"text": ...}` and expects `{"entities": [{"text", "label"}]}`
/// with spaCy-style labels. Failures are returned, never retried: the
/// parser falls through to its preposition heuristic instead.
pub struct RemoteRecognizer {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct NerRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct NerResponse {
    #[serde(default)]
    entities: Vec<NerSpan>,
}

#[derive(Deserialize)]
struct NerSpan {
    text: String,
    label: String,
}

impl RemoteRecognizer {
    /// Create a new remote recogniser
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to create NER client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::RecognizerTimeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            AppError::RecognizerError {
                message: format!("Request failed: {}", err),
            }
        }
    }
}

#[async_trait]
impl EntityRecognizer for RemoteRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&NerRequest { text })
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RecognizerError {
                message: format!("NER service error {}: {}", status, body),
            });
        }

        let result: NerResponse = response.json().await.map_err(|e| AppError::RecognizerError {
            message: format!("Failed to parse response: {}", e),
        })?;

        Ok(result
            .entities
            .into_iter()
            .map(|span| RecognizedEntity::new(span.text, EntityLabel::from_tag(&span.label)))
            .collect())
    }

    fn backend_id(&self) -> &str {
        "remote"
    }
}

// ============================================================================
// DisabledRecognizer
// ============================================================================

/// Stand-in for deployments without an NER capability
#[derive(Debug, Clone, Default)]
pub struct DisabledRecognizer;

#[async_trait]
impl EntityRecognizer for DisabledRecognizer {
    async fn recognize(&self, _text: &str) -> Result<Vec<RecognizedEntity>> {
        Err(AppError::CapabilityUnavailable {
            capability: "entities".to_string(),
        })
    }

    fn backend_id(&self) -> &str {
        "disabled"
    }
}

/// Create a recogniser based on configuration
pub fn create_recognizer(
    config: &EntityConfig,
    gazetteer: &Arc<Gazetteer>,
) -> Result<Arc<dyn EntityRecognizer>> {
    match config.provider {
        EntityProvider::Heuristic => Ok(Arc::new(HeuristicRecognizer::with_gazetteer(
            Arc::clone(gazetteer),
        ))),
        EntityProvider::Remote => {
            let endpoint = config.endpoint.clone().ok_or_else(|| {
                AppError::config("entities.endpoint is required for the remote provider")
            })?;
            Ok(Arc::new(RemoteRecognizer::new(
                endpoint,
                Duration::from_millis(config.timeout_ms),
            )?))
        }
        EntityProvider::Disabled => {
            tracing::warn!("Entity recognition disabled, destinations rely on the preposition fallback");
            Ok(Arc::new(DisabledRecognizer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpe(text: &str) -> RecognizedEntity {
        RecognizedEntity::new(text, EntityLabel::Gpe)
    }

    #[test]
    fn test_label_tags() {
        assert_eq!(EntityLabel::from_tag("GPE"), EntityLabel::Gpe);
        assert_eq!(EntityLabel::from_tag("loc"), EntityLabel::Location);
        assert_eq!(EntityLabel::from_tag("PER"), EntityLabel::Person);
        assert_eq!(EntityLabel::from_tag("NORP"), EntityLabel::Other("NORP".to_string()));
    }

    #[test]
    fn test_strips_leading_filler() {
        let entities = HeuristicRecognizer::new().extract("Book Paris for 3 days");
        assert_eq!(entities, vec![gpe("Paris")]);
    }

    #[test]
    fn test_multi_word_names_and_connectors() {
        let recognizer = HeuristicRecognizer::new();
        assert_eq!(recognizer.extract("I want to fly to New York soon"), vec![gpe("New York")]);
        assert_eq!(
            recognizer.extract("thinking about Rio de Janeiro in March"),
            vec![gpe("Rio de Janeiro"), RecognizedEntity::new("March", EntityLabel::Date)]
        );
    }

    #[test]
    fn test_punctuation_breaks_runs() {
        let recognizer = HeuristicRecognizer::with_gazetteer(Arc::new(Gazetteer::default()));
        let entities = recognizer.extract("Mumbai, Goa. Then Delhi!");
        assert_eq!(entities, vec![gpe("Mumbai"), gpe("Goa"), gpe("Delhi")]);
    }

    #[test]
    fn test_sentence_initial_word_needs_exact_place() {
        let recognizer = HeuristicRecognizer::with_gazetteer(Arc::new(Gazetteer::default()));
        assert_eq!(recognizer.extract("Some sun in Goa please"), vec![gpe("Goa")]);
        assert_eq!(recognizer.extract("Great. Ball games in Tokyo"), vec![gpe("Tokyo")]);
        assert_eq!(recognizer.extract("paris? Home soon"), Vec::<RecognizedEntity>::new());
        assert_eq!(recognizer.extract("delhi please. Paris next"), vec![gpe("Paris")]);

        // Multi-word runs and dates are kept
        assert_eq!(recognizer.extract("New Orleans in spring"), vec![gpe("New Orleans")]);
        assert_eq!(
            recognizer.extract("March is fine"),
            vec![RecognizedEntity::new("March", EntityLabel::Date)]
        );

        // Without a lexicon, a lone opening word is never a place
        assert!(HeuristicRecognizer::new().extract("Paris please").is_empty());
    }

    #[test]
    fn test_people_and_organisations() {
        let recognizer = HeuristicRecognizer::new();
        assert_eq!(
            recognizer.extract("ask Dr Kumar about Emirates Airlines"),
            vec![
                RecognizedEntity::new("Kumar", EntityLabel::Person),
                RecognizedEntity::new("Emirates Airlines", EntityLabel::Organization),
            ]
        );
    }

    #[test]
    fn test_lowercase_text_has_no_entities() {
        let entities = HeuristicRecognizer::new().extract("want to book for delhi and i will prefer desert");
        assert!(entities.is_empty());
        assert!(HeuristicRecognizer::new().extract("").is_empty());
    }

    #[test]
    fn test_disabled_recognizer_errors() {
        let err = tokio_test::block_on(DisabledRecognizer.recognize("Paris")).unwrap_err();
        assert!(matches!(err, AppError::CapabilityUnavailable { .. }));
    }

    #[test]
    fn test_create_recognizer() {
        let gazetteer = Arc::new(Gazetteer::default());
        let recognizer = create_recognizer(&EntityConfig::default(), &gazetteer).unwrap();
        assert_eq!(recognizer.backend_id(), "heuristic");

        let remote = EntityConfig {
            provider: EntityProvider::Remote,
            endpoint: None,
            timeout_ms: 100,
        };
        assert!(create_recognizer(&remote, &gazetteer).is_err());
    }
}
