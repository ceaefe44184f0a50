//! Date search backends and the strict ISO fallback
//!
//! `CalendarDateSearch` finds dates written in common natural-language
//! forms and returns them in order of appearance. Relative expressions
//! ("tomorrow", "next friday") are resolved against a [`ReferenceDate`],
//! so a parser pinned to a fixed reference stays a pure function.

use crate::config::{DateConfig, DateProvider};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use regex_lite::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

const MONTH: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";
const WEEKDAY: &str = r"monday|tuesday|wednesday|thursday|friday|saturday|sunday";

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").expect("numeric date pattern")
});

static MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?",
        MONTH
    ))
    .expect("month-first pattern")
});

static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({})\b\.?(?:,?\s+(\d{{4}})\b)?",
        MONTH
    ))
    .expect("day-first pattern")
});

static RELATIVE_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(day after tomorrow|today|tonight|tomorrow)\b").expect("relative day pattern")
});

static NEXT_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bnext\s+({})\b", WEEKDAY)).expect("next weekday pattern")
});

static WEEKEND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(this|next)\s+weekend\b").expect("weekend pattern")
});

static IN_PERIOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bin\s+(\d{1,3})\s+(days?|weeks?)\b").expect("relative period pattern")
});

static ISO_FALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'?(\d{4}-\d{2}-\d{2})'?").expect("ISO fallback pattern")
});

static STAY_LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(in\s+)?(\d{1,3})\s*-?\s*(days?|nights?|weeks?)\b").expect("stay length pattern")
});

/// Anchor for relative date expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceDate {
    /// The local calendar date at the moment of the search
    Today,
    /// A pinned date
    Fixed(NaiveDate),
}

impl ReferenceDate {
    /// Parse a pinned `YYYY-MM-DD` reference
    pub fn parse(raw: &str) -> Result<Self> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(ReferenceDate::Fixed)
            .map_err(|e| AppError::config(format!("invalid reference date {:?}: {}", raw, e)))
    }

    pub fn resolve(&self) -> NaiveDate {
        match self {
            ReferenceDate::Today => Local::now().date_naive(),
            ReferenceDate::Fixed(date) => *date,
        }
    }
}

/// A date found in text together with the span it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateMention {
    pub span: String,
    pub date: NaiveDate,
}

/// Trait for natural-language date search capabilities
#[async_trait]
pub trait DateSearch: Send + Sync {
    /// Dates mentioned in `text`, in order of appearance
    async fn search(&self, text: &str) -> Result<Vec<DateMention>>;

    /// Human-readable backend identifier
    fn backend_id(&self) -> &str;
}

/// Regex-driven natural-language date search
#[derive(Debug, Clone)]
pub struct CalendarDateSearch {
    reference: ReferenceDate,
}

struct Hit {
    start: usize,
    end: usize,
    date: NaiveDate,
}

impl CalendarDateSearch {
    pub fn new(reference: ReferenceDate) -> Self {
        Self { reference }
    }

    /// Synchronous core: all non-overlapping date mentions, earliest and
    /// then longest span first.
    pub fn find(&self, text: &str) -> Vec<DateMention> {
        let today = self.reference.resolve();
        let mut hits = Vec::new();

        collect(&NUMERIC_DATE, text, &mut hits, |caps| {
            ymd(number(caps, 1)?, number(caps, 2)?, number(caps, 3)?)
        });
        collect(&MONTH_FIRST, text, &mut hits, |caps| {
            let month = month_number(caps.get(1)?.as_str())?;
            calendar_day(today, caps.get(3), month, number(caps, 2)?)
        });
        collect(&DAY_FIRST, text, &mut hits, |caps| {
            let month = month_number(caps.get(2)?.as_str())?;
            calendar_day(today, caps.get(3), month, number(caps, 1)?)
        });
        collect(&RELATIVE_DAY, text, &mut hits, |caps| {
            let offset = match caps.get(1)?.as_str().to_lowercase().as_str() {
                "today" | "tonight" => 0,
                "tomorrow" => 1,
                _ => 2,
            };
            today.checked_add_days(Days::new(offset))
        });
        collect(&NEXT_WEEKDAY, text, &mut hits, |caps| {
            let weekday: Weekday = caps.get(1)?.as_str().parse().ok()?;
            let ahead = days_until(today.weekday(), weekday);
            today.checked_add_days(Days::new(if ahead == 0 { 7 } else { ahead }))
        });
        collect(&WEEKEND, text, &mut hits, |caps| {
            let saturday = days_until(today.weekday(), Weekday::Sat);
            let extra = if caps.get(1)?.as_str().eq_ignore_ascii_case("next") { 7 } else { 0 };
            today.checked_add_days(Days::new(saturday + extra))
        });
        collect(&IN_PERIOD, text, &mut hits, |caps| {
            let count: u64 = caps.get(1)?.as_str().parse().ok()?;
            let unit = caps.get(2)?.as_str().to_lowercase();
            let days = if unit.starts_with("week") { count * 7 } else { count };
            today.checked_add_days(Days::new(days))
        });

        hits.sort_by(|a, b| a.start.cmp(&b.start).then((b.end - b.start).cmp(&(a.end - a.start))));

        let mut mentions = Vec::new();
        let mut covered = 0;
        for hit in hits {
            if hit.start < covered {
                continue;
            }
            covered = hit.end;
            mentions.push(DateMention {
                span: text[hit.start..hit.end].to_string(),
                date: hit.date,
            });
        }
        mentions
    }
}

impl Default for CalendarDateSearch {
    fn default() -> Self {
        Self::new(ReferenceDate::Today)
    }
}

#[async_trait]
impl DateSearch for CalendarDateSearch {
    async fn search(&self, text: &str) -> Result<Vec<DateMention>> {
        Ok(self.find(text))
    }

    fn backend_id(&self) -> &str {
        "calendar"
    }
}

/// Stand-in for deployments without a date search capability
#[derive(Debug, Clone, Default)]
pub struct DisabledDateSearch;

#[async_trait]
impl DateSearch for DisabledDateSearch {
    async fn search(&self, _text: &str) -> Result<Vec<DateMention>> {
        Err(AppError::CapabilityUnavailable {
            capability: "dates".to_string(),
        })
    }

    fn backend_id(&self) -> &str {
        "disabled"
    }
}

/// Create a date search backend based on configuration
pub fn create_date_search(config: &DateConfig, reference: ReferenceDate) -> Arc<dyn DateSearch> {
    match config.provider {
        DateProvider::Calendar => Arc::new(CalendarDateSearch::new(reference)),
        DateProvider::Disabled => {
            tracing::warn!("Date search disabled, dates rely on the ISO fallback");
            Arc::new(DisabledDateSearch)
        }
    }
}

/// Strict `YYYY-MM-DD` scan, optionally single-quoted. Impossible
/// calendar dates are skipped.
pub fn iso_fallback(text: &str) -> Vec<NaiveDate> {
    ISO_FALLBACK
        .captures_iter(text)
        .filter_map(|caps| NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d").ok())
        .collect()
}

/// Explicit length of stay ("for 5 days", "2 weeks", "4-night") in days.
///
/// `in N days` is a relative date, not a length, and is skipped.
pub fn stay_length(text: &str) -> Option<u32> {
    STAY_LENGTH
        .captures_iter(text)
        .filter(|caps| caps.get(1).is_none())
        .find_map(|caps| {
            let count: u32 = caps.get(2)?.as_str().parse().ok()?;
            let unit = caps.get(3)?.as_str().to_lowercase();
            if unit.starts_with("week") {
                count.checked_mul(7)
            } else {
                Some(count)
            }
        })
}

fn collect<F>(pattern: &Regex, text: &str, hits: &mut Vec<Hit>, resolve: F)
where
    F: Fn(&Captures<'_>) -> Option<NaiveDate>,
{
    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(date) = resolve(&caps) {
            hits.push(Hit {
                start: whole.start(),
                end: whole.end(),
                date,
            });
        }
    }
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// Month/day with an optional explicit year; without one, the next
/// occurrence on or after `today`.
fn calendar_day(
    today: NaiveDate,
    year: Option<regex_lite::Match<'_>>,
    month: u32,
    day: u32,
) -> Option<NaiveDate> {
    if let Some(year) = year {
        return ymd(year.as_str().parse().ok()?, month, day);
    }

    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

pub(crate) fn days_until(from: Weekday, to: Weekday) -> u64 {
    let from = from.num_days_from_monday();
    let to = to.num_days_from_monday();
    u64::from((to + 7 - from) % 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-06-01 is a Sunday
    fn search() -> CalendarDateSearch {
        CalendarDateSearch::new(ReferenceDate::Fixed(date(2025, 6, 1)))
    }

    fn found(text: &str) -> Vec<NaiveDate> {
        search().find(text).into_iter().map(|m| m.date).collect()
    }

    #[test]
    fn test_iso_in_appearance_order() {
        let mentions = search().find("Mumbai, dates '2025-06-09' and '2025-06-04'");
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].span, "2025-06-09");
        assert_eq!(mentions[0].date, date(2025, 6, 9));
        assert_eq!(mentions[1].date, date(2025, 6, 4));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(found("leaving June 4th, 2025"), vec![date(2025, 6, 4)]);
        assert_eq!(found("from 4 June 2025 to 12 Jun 2025"), vec![date(2025, 6, 4), date(2025, 6, 12)]);
        assert_eq!(found("the 4th of July"), vec![date(2025, 7, 4)]);
        assert_eq!(found("Sept 10 - sept 14"), vec![date(2025, 9, 10), date(2025, 9, 14)]);
    }

    #[test]
    fn test_missing_year_rolls_forward() {
        assert_eq!(found("back on March 3"), vec![date(2026, 3, 3)]);
        assert_eq!(found("back on June 1"), vec![date(2025, 6, 1)]);
    }

    #[test]
    fn test_relative_expressions() {
        assert_eq!(found("tomorrow"), vec![date(2025, 6, 2)]);
        assert_eq!(found("the day after tomorrow"), vec![date(2025, 6, 3)]);
        assert_eq!(found("next friday"), vec![date(2025, 6, 6)]);
        assert_eq!(found("next Sunday"), vec![date(2025, 6, 8)]);
        assert_eq!(found("this weekend"), vec![date(2025, 6, 7)]);
        assert_eq!(found("next weekend"), vec![date(2025, 6, 14)]);
        assert_eq!(found("in 2 weeks"), vec![date(2025, 6, 15)]);
    }

    #[test]
    fn test_invalid_and_absent_dates() {
        assert!(found("2025-02-30").is_empty());
        assert!(found("book Paris for 3 days").is_empty());
        assert!(found("").is_empty());
    }

    #[test]
    fn test_iso_fallback() {
        assert_eq!(
            iso_fallback("dates '2025-06-09' and 2025-06-04x"),
            vec![date(2025, 6, 9), date(2025, 6, 4)]
        );
        assert!(iso_fallback("2025-13-01").is_empty());
        assert!(iso_fallback("no dates").is_empty());
    }

    #[test]
    fn test_stay_length() {
        assert_eq!(stay_length("book Paris for 3 days"), Some(3));
        assert_eq!(stay_length("a 4-night stay"), Some(4));
        assert_eq!(stay_length("2 weeks in Bali"), Some(14));
        assert_eq!(stay_length("leaving in 5 days for 6 days"), Some(6));
        assert_eq!(stay_length("leaving in 5 days"), None);
        assert_eq!(stay_length("no length"), None);
    }

    #[test]
    fn test_reference_parsing() {
        assert_eq!(
            ReferenceDate::parse("2025-06-01").unwrap(),
            ReferenceDate::Fixed(date(2025, 6, 1))
        );
        assert!(ReferenceDate::parse("01/06/2025").is_err());
    }

    #[tokio::test]
    async fn test_disabled_search_errors() {
        assert!(DisabledDateSearch.search("2025-06-04").await.is_err());
    }
}
