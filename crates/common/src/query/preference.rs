//! Travel preference classification

/// Recognised preference keywords, in scan order
pub const DEFAULT_PREFERENCES: &[&str] = &[
    "beach", "mountain", "lake", "city", "forest", "desert", "island",
];

/// Preference reported when no keyword is present
pub const DEFAULT_PREFERENCE: &str = "beach";

/// Ordered keyword list with a fallback value.
///
/// Matching is plain substring containment on the lower-cased text;
/// the first keyword in list order wins.
#[derive(Debug, Clone)]
pub struct PreferenceVocabulary {
    keywords: Vec<String>,
    default: String,
}

impl PreferenceVocabulary {
    pub fn new<I, S>(keywords: I, default: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            default: default.into().trim().to_lowercase(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn default_preference(&self) -> &str {
        &self.default
    }

    /// First keyword contained in `text`, or the default
    pub fn classify(&self, text: &str) -> &str {
        self.find(text).unwrap_or(self.default.as_str())
    }

    /// First keyword contained in `text`, if any
    pub fn find(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| lowered.contains(keyword.as_str()))
            .map(String::as_str)
    }

    /// Exact (case-insensitive) vocabulary membership
    pub fn recognizes(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        self.keywords.iter().any(|k| *k == keyword)
    }
}

impl Default for PreferenceVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_PREFERENCES.iter().copied(), DEFAULT_PREFERENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_when_absent() {
        let vocabulary = PreferenceVocabulary::default();
        assert_eq!(vocabulary.classify("book Paris for 3 days"), "beach");
        assert_eq!(vocabulary.classify(""), "beach");
    }

    #[test]
    fn test_case_insensitive_substring() {
        let vocabulary = PreferenceVocabulary::default();
        assert_eq!(vocabulary.classify("and DESERT i will prefer"), "desert");
        assert_eq!(vocabulary.classify("mountains please"), "mountain");
    }

    #[test]
    fn test_list_order_breaks_ties() {
        let vocabulary = PreferenceVocabulary::default();
        // "island" appears first in the text, "lake" first in the list
        assert_eq!(vocabulary.classify("an island with a lake"), "lake");
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocabulary = PreferenceVocabulary::new(["Ski", "spa"], "spa");
        assert_eq!(vocabulary.classify("skiing trip"), "ski");
        assert_eq!(vocabulary.classify("anything"), "spa");
        assert!(vocabulary.recognizes("SKI"));
        assert!(!vocabulary.recognizes("beach"));

        let vocabulary = PreferenceVocabulary::new(["ski"], " SKI ");
        assert_eq!(vocabulary.classify(""), "ski");
        assert!(vocabulary.recognizes(vocabulary.default_preference()));
    }
}
