//! Date normalization and incident/filing classification.

use chrono::NaiveDate;
use regex::Captures;

use super::patterns::{BARE_NUMERIC_DATE, DASHED_DATE, LONG_DATE, NUMERIC_DATE};
use super::text::contains_ci;

/// Leading phrases removed before parsing, applied in order.
const DATE_PREFIXES: &[&str] = &["on or about", "on", "occurred on", "happened on"];

/// Field names that usually hold filing or administrative dates.
const FILING_FIELDS: &[&str] = &["filed_date", "filing_date"];

/// Field names that always hold incident dates.
const INCIDENT_FIELDS: &[&str] = &["facts_date", "incident_date", "accident_date"];

/// Phrases that mark a filing-field date as describing the incident.
const FILING_OVERRIDE_CONTEXT: &[&str] = &["on or about", "occurred on", "happened on", "incident on"];

/// Phrases that mark any date as describing the incident.
const INCIDENT_CONTEXT: &[&str] = &["on or about", "occurred on", "happened on"];

/// Generic date extractors whose output is a filing date unless worded otherwise.
const LIKELY_FILING_FIELDS: &[&str] = &["numeric_date", "multiple_dates_extractor", "advanced_incident_date"];

const INCIDENT_WORDS: &[&str] = &["on or about", "occurred", "happened", "incident", "accident", "collision"];

/// Convert a date spelling to `YYYY-MM-DD`.
///
/// Accepts `M/D/YYYY`, `Month D[st|nd|rd|th][,] YYYY` and `M-D-YYYY` anywhere
/// in the string, after stripping phrases like "on or about". The first
/// spelling that forms a real calendar date wins.
pub fn to_standard_date(raw: &str) -> Option<String> {
    let mut clean = raw.trim();
    for prefix in DATE_PREFIXES {
        if starts_with_ci(clean, prefix) {
            clean = clean[prefix.len()..].trim();
        }
    }

    let numeric = |caps: &Captures| ymd(&caps[3], &caps[1], &caps[2]);
    let long = |caps: &Captures| {
        let month = month_to_number(&caps[1])?;
        ymd(&caps[3], &month.to_string(), &caps[2])
    };

    NUMERIC_DATE
        .captures(clean)
        .and_then(|c| numeric(&c))
        .or_else(|| LONG_DATE.captures(clean).and_then(|c| long(&c)))
        .or_else(|| DASHED_DATE.captures(clean).and_then(|c| numeric(&c)))
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Decide whether a date from `source_field` describes the incident itself.
///
/// Rules are checked in order and the first that applies decides; anything
/// left undecided counts as an incident date.
pub fn is_true_incident_date(source_field: &str, raw: &str) -> bool {
    if FILING_FIELDS.iter().any(|f| source_field.contains(f)) {
        return FILING_OVERRIDE_CONTEXT.iter().any(|c| contains_ci(raw, c));
    }

    if INCIDENT_FIELDS.iter().any(|f| source_field.contains(f)) {
        return true;
    }

    if INCIDENT_CONTEXT.iter().any(|c| contains_ci(raw, c)) {
        return true;
    }

    if LIKELY_FILING_FIELDS.contains(&source_field)
        && !INCIDENT_WORDS.iter().any(|w| contains_ci(raw, w))
    {
        return false;
    }

    !is_bare_numeric_date(raw)
}

/// `MM/DD/YYYY` with nothing else around it.
pub fn is_bare_numeric_date(raw: &str) -> bool {
    BARE_NUMERIC_DATE.is_match(raw.trim())
}

/// Split a multi-date summary (`"A (x, y) | B"`) into `(entry, date text)`
/// pairs.
pub fn summary_entries(summary: &str) -> impl Iterator<Item = (&str, &str)> {
    summary.split(" | ").map(|entry| {
        let date = entry.split(" (").next().unwrap_or(entry).trim();
        (entry, date)
    })
}

/// Standardize every date of a multi-date summary, keeping the ones that parse.
pub fn standardize_multiple_dates(summary: &str) -> String {
    if summary.is_empty() || summary == "NA" {
        return String::new();
    }
    summary_entries(summary)
        .filter_map(|(_, date)| to_standard_date(date))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn starts_with_ci(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len() && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_to_number(month: &str) -> Option<u32> {
    let number = match month.to_lowercase().as_str() {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    };
    Some(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_date_numeric() {
        assert_eq!(to_standard_date("07/04/2024").as_deref(), Some("2024-07-04"));
        assert_eq!(to_standard_date("7/4/2024").as_deref(), Some("2024-07-04"));
    }

    #[test]
    fn test_standard_date_long_form() {
        assert_eq!(to_standard_date("July 4th, 2024").as_deref(), Some("2024-07-04"));
        assert_eq!(to_standard_date("december 31 2023").as_deref(), Some("2023-12-31"));
        assert_eq!(to_standard_date("March 1st 2024").as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn test_standard_date_dashed() {
        assert_eq!(to_standard_date("03-15-2024").as_deref(), Some("2024-03-15"));
    }

    #[test]
    fn test_standard_date_strips_prefixes() {
        assert_eq!(to_standard_date("On or about March 1, 2024").as_deref(), Some("2024-03-01"));
        assert_eq!(to_standard_date("occurred on 03/01/2024").as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn test_standard_date_rejects() {
        assert_eq!(to_standard_date("not a date"), None);
        assert_eq!(to_standard_date(""), None);
        // not a calendar date
        assert_eq!(to_standard_date("February 30, 2024"), None);
        assert_eq!(to_standard_date("13/45/2024"), None);
    }

    #[test]
    fn test_standard_date_falls_through_invalid_numeric() {
        // 31/12/2024 is not M/D; the long form later in the text still parses
        assert_eq!(
            to_standard_date("31/12/2024 or January 5, 2025").as_deref(),
            Some("2025-01-05")
        );
    }

    #[test]
    fn test_filing_field_classification() {
        assert!(!is_true_incident_date("filed_date", "07/07/2025"));
        assert!(is_true_incident_date("filed_date", "occurred on 07/07/2025"));
        assert!(is_true_incident_date("filing_date", "incident on July 7, 2025"));
        assert!(!is_true_incident_date("filing_date", "July 7, 2025"));
    }

    #[test]
    fn test_incident_field_classification() {
        assert!(is_true_incident_date("facts_date", "anything"));
        assert!(is_true_incident_date("accident_date", "07/07/2025"));
        // substring match on the field name
        assert!(is_true_incident_date("subject_incident_date", "07/07/2025"));
    }

    #[test]
    fn test_likely_filing_fields() {
        assert!(!is_true_incident_date("numeric_date", "July 7, 2025"));
        assert!(is_true_incident_date("numeric_date", "collision of July 7, 2025"));
        assert!(is_true_incident_date("multiple_dates_extractor", "May 2, 2024 (accident)"));
        assert!(is_true_incident_date("advanced_incident_date", "on or about May 2, 2024"));
    }

    #[test]
    fn test_bare_date_default() {
        assert!(!is_true_incident_date("loss_date", "07/07/2025"));
        assert!(is_true_incident_date("loss_date", "July 7, 2025"));
    }

    #[test]
    fn test_standardize_multiple_dates() {
        assert_eq!(
            standardize_multiple_dates("March 1, 2024 (collision, injured) | June 2, 2024"),
            "2024-03-01 | 2024-06-02"
        );
        assert_eq!(standardize_multiple_dates("NA"), "");
        assert_eq!(standardize_multiple_dates(""), "");
    }
}
