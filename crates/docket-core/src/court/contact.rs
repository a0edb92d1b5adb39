//! Plaintiff contact block extraction.
//!
//! The contact block follows the jury demand in most petitions. The scanner
//! looks for a trigger phrase line by line (exact first, then fuzzy to
//! survive OCR damage), takes a fixed window after it and filters out
//! boilerplate lines.

use tracing::{debug, trace};

use crate::models::config::ExtractionConfig;

use super::rules::similarity::ratio;
use super::rules::text::{find_ci, floor_boundary, normalize};

/// Phrases that open the contact block.
pub const TRIGGER_PHRASES: &[&str] = &[
    "PLAINTIFF HEREBY DEMANDSA JURYTRIAL ON ALL ISSUES SO TRIABLE.",
    "Plaintiff demands trial by jury on all issues triable as of right.",
    "jury demand",
    "jury trial demanded",
    "plaintiff demands",
    "plaintiff hereby demands",
];

/// Lines containing any of these are dropped.
const REMOVE_TERMS: &[&str] = &[
    "hereby",
    "demands",
    "jury",
    "trial",
    "issues",
    "triable",
    "respectfully",
    "submitted",
    "this",
];

/// The first line containing any of these ends the block.
const CUTOFF_TERMS: &[&str] = &[
    "attorneys for plaintiff",
    "benefits",
    "explanation",
    "patient",
    "transaction",
    "history",
    "charges",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScanState {
    Searching,
    /// Byte offset where the contact window starts.
    Found(usize),
}

struct Trigger {
    phrase: String,
    normalized: String,
}

/// Locates and cleans the plaintiff contact block.
pub struct ContactExtractor {
    triggers: Vec<Trigger>,
    window_chars: usize,
    threshold: f64,
}

impl ContactExtractor {
    /// Create an extractor with the default triggers, a 500 character
    /// window and a 0.8 similarity threshold.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            triggers: Vec::new(),
            window_chars: config.contact_window_chars,
            threshold: config.contact_similarity_threshold,
        }
        .with_triggers(TRIGGER_PHRASES)
    }

    /// Replace the trigger phrase list.
    pub fn with_triggers<S: AsRef<str>>(mut self, phrases: &[S]) -> Self {
        self.triggers = phrases
            .iter()
            .map(|p| Trigger {
                phrase: p.as_ref().to_string(),
                normalized: normalize(p.as_ref()),
            })
            .collect();
        self
    }

    /// Byte offset of the trigger: the match itself for an exact hit, the
    /// start of the line for a fuzzy one.
    pub fn find_trigger(&self, text: &str) -> Option<usize> {
        let mut state = ScanState::Searching;
        let mut line_start = 0;

        for line in text.split('\n') {
            state = self.scan_line(line, line_start);
            if let ScanState::Found(_) = state {
                break;
            }
            line_start += line.len() + 1;
        }

        match state {
            ScanState::Found(offset) => Some(offset),
            ScanState::Searching => None,
        }
    }

    fn scan_line(&self, line: &str, line_start: usize) -> ScanState {
        for trigger in &self.triggers {
            if let Some(pos) = find_ci(line, &trigger.phrase, 0) {
                trace!("Exact contact trigger {:?} at {}", trigger.phrase, line_start + pos);
                return ScanState::Found(line_start + pos);
            }
        }

        let normalized = normalize(line);
        for trigger in &self.triggers {
            let similarity = ratio(&trigger.normalized, &normalized);
            if similarity > self.threshold {
                trace!(
                    "Fuzzy contact trigger {:?} ({:.2}) at {}",
                    trigger.phrase, similarity, line_start
                );
                return ScanState::Found(line_start);
            }
        }

        ScanState::Searching
    }

    /// Contact lines after the trigger, boilerplate removed.
    pub fn extract_lines(&self, text: &str) -> Vec<String> {
        let Some(start) = self.find_trigger(text) else {
            return Vec::new();
        };
        let end = text[start..]
            .char_indices()
            .nth(self.window_chars)
            .map_or(text.len(), |(i, _)| start + i);

        clean_contact(&text[floor_boundary(text, start)..end])
    }

    /// Contact block joined by newlines, or `None` when nothing survives.
    pub fn extract(&self, text: &str) -> Option<String> {
        let lines = self.extract_lines(text);
        if lines.is_empty() {
            debug!("No plaintiff contact block found");
            return None;
        }
        debug!("Plaintiff contact block with {} lines", lines.len());
        Some(lines.join("\n"))
    }
}

impl Default for ContactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Filter a contact window down to the contact lines.
///
/// Blank lines and lines with a remove term are skipped. The first line with
/// a cutoff term ends the block and is itself excluded.
pub fn clean_contact(window: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for line in window.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();
        if REMOVE_TERMS.iter().any(|t| lower.contains(t)) {
            continue;
        }
        if CUTOFF_TERMS.iter().any(|t| lower.contains(t)) {
            break;
        }
        lines.push(line.to_string());
    }
    lines
}
