//! Common regex patterns for court document extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Date spellings accepted by the date normalizer, in the order tried
    pub static ref NUMERIC_DATE: Regex = Regex::new(
        r"(\d{1,2})/(\d{1,2})/(\d{4})"
    ).unwrap();

    pub static ref LONG_DATE: Regex = Regex::new(
        r"(?i)(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})"
    ).unwrap();

    pub static ref DASHED_DATE: Regex = Regex::new(
        r"(\d{1,2})-(\d{1,2})-(\d{4})"
    ).unwrap();

    // A date with nothing around it, the usual shape of a filing stamp
    pub static ref BARE_NUMERIC_DATE: Regex = Regex::new(
        r"^\d{2}/\d{2}/\d{4}$"
    ).unwrap();

    // Case numbers such as 2024-CI-000123-A
    pub static ref CASE_NUMBER: Regex = Regex::new(
        r"\d{4}-[A-Z]{2}-\d{6}-[A-Z]"
    ).unwrap();

    pub static ref EMAIL: Regex = Regex::new(
        r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b"
    ).unwrap();
}
