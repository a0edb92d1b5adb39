//! Target patterns scored by the keywords surrounding them.

use regex::Regex;

use crate::court::catalog::{ContextualParams, StrategyKind};
use crate::court::rules::text::{contains_ci, find_all_ci, window};
use crate::pdf::DocumentText;

use super::{Compiler, ExtractionCandidate, Strategy, best_match};

const PRIMARY_SCORE: f64 = 1.0;
const SECONDARY_BONUS: f64 = 0.5;

pub struct ContextualSearchStrategy {
    primary_keywords: Vec<String>,
    secondary_keywords: Vec<String>,
    targets: Vec<Regex>,
    search_radius: usize,
}

impl ContextualSearchStrategy {
    pub(crate) fn build(params: &ContextualParams, compiler: &mut Compiler<'_>) -> Self {
        let non_empty = |keywords: &[String]| {
            keywords
                .iter()
                .filter(|k| !k.is_empty())
                .cloned()
                .collect::<Vec<_>>()
        };
        Self {
            primary_keywords: non_empty(&params.primary_keywords),
            secondary_keywords: non_empty(&params.secondary_keywords),
            targets: compiler.compile_all(&params.target_patterns),
            search_radius: params.search_radius,
        }
    }

    /// Offsets of every primary keyword occurrence, keyword by keyword.
    fn anchors(&self, text: &str) -> Vec<usize> {
        self.primary_keywords
            .iter()
            .flat_map(|keyword| find_all_ci(text, keyword))
            .collect()
    }

    fn score(&self, context: &str) -> f64 {
        let secondary = self
            .secondary_keywords
            .iter()
            .filter(|k| contains_ci(context, k))
            .count();
        PRIMARY_SCORE + SECONDARY_BONUS * secondary as f64
    }
}

impl Strategy for ContextualSearchStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ContextualSearch
    }

    fn extract(&self, doc: &DocumentText<'_>) -> Option<String> {
        let mut best: Option<ExtractionCandidate> = None;

        for anchor in self.anchors(doc.text) {
            let context = window(doc.text, anchor, anchor, self.search_radius, self.search_radius);
            let score = self.score(context);

            for target in &self.targets {
                let Some(caps) = target.captures(context) else {
                    continue;
                };
                // strictly greater: the first candidate at a score keeps it
                if best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(ExtractionCandidate::new(best_match(&caps), score, anchor));
                }
            }
        }

        best.map(|c| c.text)
    }
}
