//! Gazetteer - the closed list of bookable destinations
//!
//! Candidates coming out of entity recognition or the preposition
//! fallback are only ever reported through [`Gazetteer::closest`], so a
//! parsed destination is always a canonical entry.

/// Destinations known to the booking desk when none are configured
pub const DEFAULT_DESTINATIONS: &[&str] = &[
    "Paris", "London", "New York", "Tokyo", "Mumbai", "Delhi", "Goa",
    "Bangalore", "Chennai", "Kolkata", "Jaipur", "Manali", "Shimla",
    "Dubai", "Singapore", "Bangkok", "Bali", "Maldives", "Rome",
    "Barcelona", "Lisbon", "Amsterdam", "Berlin", "Istanbul", "Cairo",
    "Cape Town", "Sydney", "Kyoto", "Los Angeles", "San Francisco",
    "Rio de Janeiro", "Reykjavik",
];

/// Default minimum similarity for a match
pub const DEFAULT_THRESHOLD: f64 = 0.75;

/// Ordered, read-only list of canonical destinations with a fuzzy matcher
#[derive(Debug, Clone)]
pub struct Gazetteer {
    entries: Vec<String>,
    threshold: f64,
}

impl Gazetteer {
    /// Build a gazetteer; blank entries and exact duplicates are dropped,
    /// order is otherwise preserved.
    pub fn new<I, S>(entries: I, threshold: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for entry in entries {
            let entry = entry.into().trim().to_string();
            if !entry.is_empty() && !unique.contains(&entry) {
                unique.push(entry);
            }
        }

        Self {
            entries: unique,
            threshold,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Exact (case-sensitive) membership
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry == name)
    }

    /// Entry equal to `name` ignoring case, without fuzzy matching
    pub fn lookup(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.to_lowercase() == name)
            .map(String::as_str)
    }

    /// Closest entry whose similarity to `candidate` reaches the threshold.
    ///
    /// Ties keep the earliest entry in gazetteer order.
    pub fn closest(&self, candidate: &str) -> Option<&str> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return None;
        }
        let needle = candidate.to_lowercase();

        let mut best: Option<(&str, f64)> = None;
        for entry in &self.entries {
            let score = similarity(&needle, &entry.to_lowercase());
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((entry.as_str(), score));
            }
        }

        match best {
            Some((entry, score)) if score >= self.threshold => {
                tracing::trace!(candidate, entry, score, "Gazetteer match");
                Some(entry)
            }
            _ => None,
        }
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::new(DEFAULT_DESTINATIONS.iter().copied(), DEFAULT_THRESHOLD)
    }
}

/// Normalized edit-distance similarity in 0.0..=1.0
fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_case_variance() {
        let gazetteer = Gazetteer::default();
        assert_eq!(gazetteer.closest("Paris"), Some("Paris"));
        assert_eq!(gazetteer.closest("delhi"), Some("Delhi"));
        assert_eq!(gazetteer.closest("  NEW YORK "), Some("New York"));
    }

    #[test]
    fn test_misspelling_resolves() {
        let gazetteer = Gazetteer::default();
        assert_eq!(gazetteer.closest("Mumbay"), Some("Mumbai"));
        assert_eq!(gazetteer.closest("Barcelonna"), Some("Barcelona"));
    }

    #[test]
    fn test_below_threshold_rejected() {
        let gazetteer = Gazetteer::default();
        assert_eq!(gazetteer.closest("Zzzzyx"), None);
        assert_eq!(gazetteer.closest("For Delhi"), None);
        assert_eq!(gazetteer.closest(""), None);
        assert_eq!(gazetteer.closest("   "), None);
    }

    #[test]
    fn test_ties_keep_gazetteer_order() {
        // "Rim" is one edit away from both entries
        let gazetteer = Gazetteer::new(["Rime", "Rima"], 0.5);
        assert_eq!(gazetteer.closest("Rim"), Some("Rime"));

        let reversed = Gazetteer::new(["Rima", "Rime"], 0.5);
        assert_eq!(reversed.closest("Rim"), Some("Rima"));
    }

    #[test]
    fn test_blank_and_duplicate_entries_dropped() {
        let gazetteer = Gazetteer::new(["Goa", " ", "Goa", "Bali"], DEFAULT_THRESHOLD);
        assert_eq!(gazetteer.entries(), &["Goa".to_string(), "Bali".to_string()]);
        assert!(gazetteer.contains("Bali"));
        assert!(!gazetteer.contains("bali"));
        assert_eq!(gazetteer.lookup("bALI"), Some("Bali"));
        assert_eq!(gazetteer.lookup("Bal"), None);
    }

    #[test]
    fn test_custom_threshold() {
        let strict = Gazetteer::new(["Mumbai"], 0.95);
        assert_eq!(strict.closest("Mumbay"), None);
        assert_eq!(strict.closest("mumbai"), Some("Mumbai"));
    }
}
