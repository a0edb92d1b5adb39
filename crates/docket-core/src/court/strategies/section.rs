//! Text between a start keyword and the next end keyword.

use crate::court::catalog::{SectionParams, StrategyKind};
use crate::court::rules::text::find_ci;
use crate::pdf::DocumentText;

use super::Strategy;

pub struct SectionStrategy {
    start_keywords: Vec<String>,
    end_keywords: Vec<String>,
}

impl SectionStrategy {
    pub fn new(params: &SectionParams) -> Self {
        let non_empty = |keywords: &[String]| {
            keywords
                .iter()
                .filter(|k| !k.is_empty())
                .cloned()
                .collect::<Vec<_>>()
        };
        Self {
            start_keywords: non_empty(&params.start_keywords),
            end_keywords: non_empty(&params.end_keywords),
        }
    }

    /// Offset just past the earliest start keyword. The first listed keyword
    /// wins when two start at the same offset.
    fn section_start(&self, text: &str) -> Option<usize> {
        let mut earliest: Option<(usize, usize)> = None;
        for keyword in &self.start_keywords {
            if let Some(pos) = find_ci(text, keyword, 0) {
                if earliest.is_none_or(|(best, _)| pos < best) {
                    earliest = Some((pos, keyword.len()));
                }
            }
        }
        earliest.map(|(pos, len)| pos + len)
    }
}

impl Strategy for SectionStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SectionPattern
    }

    fn extract(&self, doc: &DocumentText<'_>) -> Option<String> {
        let text = doc.text;
        let start = self.section_start(text)?;

        let end = self
            .end_keywords
            .iter()
            .filter_map(|k| find_ci(text, k, start))
            .min()
            .unwrap_or(text.len());

        (start < end).then(|| text[start..end].trim().to_string())
    }
}
