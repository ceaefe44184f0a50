//! Destination resolution: entity candidates first, preposition runs second

use super::entities::RecognizedEntity;
use super::gazetteer::Gazetteer;
use regex_lite::Regex;
use std::sync::LazyLock;

/// Prepositions that introduce a destination, in scan order
pub const PREPOSITIONS: &[&str] = &["to", "in", "for", "at", "from"];

/// Filler words dropped from a preposition run before matching
pub const STOPWORDS: &[&str] = &[
    "book", "travel", "trip", "want", "date", "will", "be", "and", "i", "prefer", "prefered",
];

static PREPOSITION_RUNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PREPOSITIONS
        .iter()
        .map(|prep| {
            Regex::new(&format!(r"(?i)\b{}\s+([a-z][a-z\s]*)", prep)).expect("preposition pattern")
        })
        .collect()
});

/// Pipeline stage that produced the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    Entities,
    Prepositions,
    Unresolved,
}

impl ResolutionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStage::Entities => "entities",
            ResolutionStage::Prepositions => "prepositions",
            ResolutionStage::Unresolved => "unresolved",
        }
    }
}

/// First geo-political candidate that matches the gazetteer
pub fn from_entities<'g>(gazetteer: &'g Gazetteer, entities: &[RecognizedEntity]) -> Option<&'g str> {
    entities
        .iter()
        .filter(|entity| entity.is_geopolitical())
        .find_map(|entity| gazetteer.closest(&entity.text))
}

/// First preposition run that matches the gazetteer.
///
/// Prepositions are tried in [`PREPOSITIONS`] order and, for each, its
/// occurrences in text order.
pub fn from_prepositions<'g>(gazetteer: &'g Gazetteer, text: &str) -> Option<&'g str> {
    PREPOSITION_RUNS.iter().find_map(|pattern| {
        pattern.captures_iter(text).find_map(|caps| {
            let candidate = clean_run(caps.get(1)?.as_str());
            tracing::trace!(candidate = %candidate, "Preposition candidate");
            gazetteer.closest(&candidate)
        })
    })
}

/// Drop stopwords and title-case what is left
pub fn clean_run(run: &str) -> String {
    run.split_whitespace()
        .filter(|word| !STOPWORDS.contains(&word.to_lowercase().as_str()))
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::entities::EntityLabel;

    #[test]
    fn test_clean_run() {
        assert_eq!(clean_run("delhi and date will be "), "Delhi");
        assert_eq!(clean_run("book for NEW york"), "For New York");
        assert_eq!(clean_run("   "), "");
    }

    #[test]
    fn test_entities_skip_non_geopolitical() {
        let gazetteer = Gazetteer::default();
        let entities = vec![
            RecognizedEntity::new("Paris", EntityLabel::Person),
            RecognizedEntity::new("Atlantis", EntityLabel::Gpe),
            RecognizedEntity::new("Tokio", EntityLabel::Gpe),
        ];
        assert_eq!(from_entities(&gazetteer, &entities), Some("Tokyo"));
        assert_eq!(from_entities(&gazetteer, &[]), None);
    }

    #[test]
    fn test_prepositions_scan_in_list_order() {
        let gazetteer = Gazetteer::default();
        let text = "want to book for delhi and date will be '2025-06-04' and '2025-06-09'";
        assert_eq!(from_prepositions(&gazetteer, text), Some("Delhi"));

        // "to" is scanned before "from" even though "from" comes first
        let text = "from london to paris";
        assert_eq!(from_prepositions(&gazetteer, text), Some("Paris"));
    }

    #[test]
    fn test_prepositions_require_word_boundary() {
        let gazetteer = Gazetteer::default();
        assert_eq!(from_prepositions(&gazetteer, "into goa"), None);
        assert_eq!(from_prepositions(&gazetteer, "trip to zzzzyx"), None);
        assert_eq!(from_prepositions(&gazetteer, ""), None);
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(ResolutionStage::Entities.as_str(), "entities");
        assert_eq!(ResolutionStage::Unresolved.as_str(), "unresolved");
    }
}
