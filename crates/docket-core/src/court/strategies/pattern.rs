//! Plain regex search.

use regex::Regex;

use crate::court::catalog::{RegexParams, StrategyKind};
use crate::court::rules::text::char_len;
use crate::pdf::DocumentText;

use super::{Compiler, Strategy};

/// First match of a single regex. A capture group replaces the whole match
/// only when it is strictly longer.
pub struct RegexStrategy {
    regex: Regex,
}

impl RegexStrategy {
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }

    pub(crate) fn build(params: &RegexParams, compiler: &mut Compiler<'_>) -> Option<Self> {
        compiler.compile(&params.regex).map(Self::new)
    }
}

impl Strategy for RegexStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Regex
    }

    fn extract(&self, doc: &DocumentText<'_>) -> Option<String> {
        let caps = self.regex.captures(doc.text)?;
        let whole = caps.get(0)?.as_str();

        let longer_group = caps
            .iter()
            .skip(1)
            .flatten()
            .map(|g| g.as_str())
            .find(|g| char_len(g) > char_len(whole));

        Some(longer_group.unwrap_or(whole).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::RegexBuilder;

    fn strategy(pattern: &str) -> RegexStrategy {
        RegexStrategy::new(RegexBuilder::new(pattern).case_insensitive(true).build().unwrap())
    }

    #[test]
    fn test_returns_whole_match_over_groups() {
        let s = strategy(r"(June) \d{1,2}(?:th)?, \d{4}");
        let doc = DocumentText::text_only("hearing set for June 17th, 2025 at noon");
        assert_eq!(s.extract(&doc).as_deref(), Some("June 17th, 2025"));
    }

    #[test]
    fn test_case_insensitive() {
        let s = strategy(r"cause no\.\s*\S+");
        let doc = DocumentText::text_only("CAUSE NO. 2024-CI-000123-A");
        assert_eq!(s.extract(&doc).as_deref(), Some("CAUSE NO. 2024-CI-000123-A"));
    }

    #[test]
    fn test_no_match() {
        let s = strategy(r"\d{3}-\d{4}");
        assert_eq!(s.extract(&DocumentText::text_only("no phone here")), None);
    }
}
