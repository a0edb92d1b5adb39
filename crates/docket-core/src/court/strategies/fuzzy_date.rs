//! Date patterns tolerant of OCR spacing and punctuation noise.

use regex::Regex;

use crate::court::catalog::{FuzzyDateParams, StrategyKind};
use crate::court::rules::text::{find_ci, window};
use crate::pdf::DocumentText;

use super::{Compiler, Strategy, best_match};

const BEFORE_KEYWORD: usize = 200;
const AFTER_KEYWORD: usize = 300;

pub struct FuzzyDateStrategy {
    variants: Vec<Regex>,
    context_keywords: Vec<String>,
}

/// The base pattern plus relaxed spellings: optional whitespace, comma or
/// period, and loose separators in place of a colon.
fn variants(base: &str) -> Vec<String> {
    let candidates = [
        base.to_string(),
        base.replace(r"\s+", r"\s*"),
        base.replace(',', "[,.]?"),
        base.replace(':', r"[:\-\s]*"),
    ];

    let mut unique: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

impl FuzzyDateStrategy {
    pub(crate) fn build(params: &FuzzyDateParams, compiler: &mut Compiler<'_>) -> Self {
        let variants = params
            .base_patterns
            .iter()
            .flat_map(|base| variants(base))
            .filter_map(|p| compiler.compile(&p))
            .collect();

        Self {
            variants,
            context_keywords: params
                .context_keywords
                .iter()
                .filter(|k| !k.is_empty())
                .cloned()
                .collect(),
        }
    }

    fn first_match(&self, text: &str) -> Option<String> {
        self.variants
            .iter()
            .find_map(|re| re.captures(text))
            .map(|caps| best_match(&caps))
    }
}

impl Strategy for FuzzyDateStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FuzzyDate
    }

    fn extract(&self, doc: &DocumentText<'_>) -> Option<String> {
        let near_keyword = self.context_keywords.iter().find_map(|keyword| {
            let pos = find_ci(doc.text, keyword, 0)?;
            self.first_match(window(doc.text, pos, pos, BEFORE_KEYWORD, AFTER_KEYWORD))
        });

        near_keyword.or_else(|| self.first_match(doc.text))
    }
}
