//! Field extraction strategies.
//!
//! Each [`FieldPattern`] is turned into a boxed [`Strategy`] once, when an
//! extractor is built. Sub-pattern regexes are compiled at that point; a
//! sub-pattern that fails to compile is reported as a [`PatternError`] and
//! left out, the rest of the field still works.

mod case_title;
mod contextual;
mod email;
mod facts;
mod fuzzy_date;
mod multi_date;
mod multi_pattern;
mod nearest_word;
mod pattern;
mod section;

pub use case_title::CaseTitleStrategy;
pub use contextual::ContextualSearchStrategy;
pub use email::{EmailStrategy, extract_emails};
pub use facts::FactsDateStrategy;
pub use fuzzy_date::FuzzyDateStrategy;
pub use multi_date::MultiDateStrategy;
pub use multi_pattern::MultiPatternStrategy;
pub use nearest_word::NearestWordStrategy;
pub use pattern::RegexStrategy;
pub use section::SectionStrategy;

use regex::{Captures, Regex, RegexBuilder};
use tracing::warn;

use crate::court::catalog::{FieldPattern, StrategyKind};
use crate::error::PatternError;
use crate::pdf::DocumentText;

use super::rules::text::char_len;

/// Trait for field extraction strategies.
pub trait Strategy: Send + Sync {
    /// Which catalog strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Extract the field value from a document.
    fn extract(&self, doc: &DocumentText<'_>) -> Option<String>;
}

/// A scored candidate value, local to one strategy run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionCandidate {
    /// Candidate text.
    pub text: String,
    /// Strategy-specific score, higher is better.
    pub score: f64,
    /// Byte offset of the match in the document text.
    pub position: usize,
}

impl ExtractionCandidate {
    pub fn new(text: impl Into<String>, score: f64, position: usize) -> Self {
        Self {
            text: text.into(),
            score,
            position,
        }
    }
}

/// Outcome of dispatching one field.
pub struct Dispatched {
    /// The runnable strategy, `None` when the field can never produce a value.
    pub strategy: Option<Box<dyn Strategy>>,
    /// Sub-patterns that failed to compile.
    pub errors: Vec<PatternError>,
}

/// Build the strategy for a field's pattern.
pub fn dispatch(field: &str, pattern: &FieldPattern) -> Dispatched {
    let mut compiler = Compiler::new(field);

    let strategy: Option<Box<dyn Strategy>> = match pattern {
        FieldPattern::Regex(p) => RegexStrategy::build(p, &mut compiler).map(boxed),
        FieldPattern::NearestWord(p) => Some(boxed(NearestWordStrategy::new(p))),
        FieldPattern::SectionPattern(p) => Some(boxed(SectionStrategy::new(p))),
        FieldPattern::FactsPattern(p) => FactsDateStrategy::build(p, &mut compiler).map(boxed),
        FieldPattern::CaseTitle(p) => Some(boxed(CaseTitleStrategy::new(p))),
        FieldPattern::FuzzyDate(p) => Some(boxed(FuzzyDateStrategy::build(p, &mut compiler))),
        FieldPattern::ContextualSearch(p) => {
            Some(boxed(ContextualSearchStrategy::build(p, &mut compiler)))
        }
        FieldPattern::MultiPattern(p) => Some(boxed(MultiPatternStrategy::build(p, &mut compiler))),
        FieldPattern::MultiDate(p) => Some(boxed(MultiDateStrategy::build(p, &mut compiler))),
        FieldPattern::Email(p) => Some(boxed(EmailStrategy::new(p.domain_case_insensitive))),
        FieldPattern::Unknown => None,
    };

    Dispatched {
        strategy,
        errors: compiler.errors,
    }
}

fn boxed<S: Strategy + 'static>(strategy: S) -> Box<dyn Strategy> {
    Box::new(strategy)
}

/// Compiles sub-patterns for one field, collecting failures.
pub(crate) struct Compiler<'a> {
    field: &'a str,
    errors: Vec<PatternError>,
}

impl<'a> Compiler<'a> {
    fn new(field: &'a str) -> Self {
        Self {
            field,
            errors: Vec::new(),
        }
    }

    /// Compile a case-insensitive regex. Empty patterns are ignored.
    pub(crate) fn compile(&mut self, pattern: &str) -> Option<Regex> {
        if pattern.is_empty() {
            return None;
        }
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(source) => {
                let error = PatternError {
                    field: self.field.to_string(),
                    pattern: pattern.to_string(),
                    source,
                };
                warn!("Skipping sub-pattern: {}", error);
                self.errors.push(error);
                None
            }
        }
    }

    pub(crate) fn compile_all<S: AsRef<str>>(&mut self, patterns: &[S]) -> Vec<Regex> {
        patterns
            .iter()
            .filter_map(|p| self.compile(p.as_ref()))
            .collect()
    }
}

/// Longest non-empty capture group, else the whole match. Earlier groups
/// win ties.
pub(crate) fn best_match(caps: &Captures<'_>) -> String {
    let mut best: Option<&str> = None;
    for group in caps.iter().skip(1).flatten() {
        let text = group.as_str();
        if text.is_empty() {
            continue;
        }
        if best.is_none_or(|b| char_len(text) > char_len(b)) {
            best = Some(text);
        }
    }
    best.or_else(|| caps.get(0).map(|m| m.as_str()))
        .unwrap_or_default()
        .to_string()
}

/// Lowercased keywords with empty entries removed.
pub(crate) fn lowered(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| k.to_lowercase())
        .collect()
}
