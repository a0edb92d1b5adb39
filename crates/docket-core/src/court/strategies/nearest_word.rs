//! Spatial search: the words printed to the right of a keyword.

use crate::court::catalog::{Direction, NearestWordParams, StrategyKind};
use crate::pdf::{DocumentText, TextElement};

use super::{Strategy, lowered};

/// How many following elements are inspected after a keyword hit.
const LOOKAHEAD: usize = 20;

/// Maximum vertical offset for two elements to count as one line.
const SAME_LINE_TOLERANCE: f32 = 10.0;

pub struct NearestWordStrategy {
    keywords: Vec<String>,
    position: Direction,
    max_distance: f32,
    extract_words: usize,
    extract_until: Vec<String>,
}

impl NearestWordStrategy {
    pub fn new(params: &NearestWordParams) -> Self {
        Self {
            keywords: lowered(&params.keywords),
            position: params.position,
            max_distance: params.max_distance,
            extract_words: params.extract_words.max(1),
            extract_until: params.extract_until.clone(),
        }
    }

    /// Texts on the same line to the right of `elements[index]`, looking at
    /// the next `LOOKAHEAD - 1` elements only.
    fn words_right_of<'e>(&self, elements: &'e [TextElement], index: usize) -> Vec<&'e str> {
        let anchor = &elements[index];
        let end = (index + LOOKAHEAD).min(elements.len());

        elements[index + 1..end]
            .iter()
            .filter(|next| {
                next.page == anchor.page
                    && (next.y0 - anchor.y0).abs() < SAME_LINE_TOLERANCE
                    && next.x0 - anchor.x1 < self.max_distance
            })
            .map(|next| next.text.as_str())
            .take(self.extract_words)
            .collect()
    }

    fn truncate_at_delimiter<'a>(&self, value: &'a str) -> &'a str {
        self.extract_until
            .iter()
            .find_map(|d| value.find(d.as_str()))
            .map_or(value, |pos| &value[..pos])
    }
}

impl Strategy for NearestWordStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NearestWord
    }

    fn extract(&self, doc: &DocumentText<'_>) -> Option<String> {
        if self.position != Direction::Right {
            return None;
        }

        for keyword in &self.keywords {
            for (i, element) in doc.elements.iter().enumerate() {
                if !element.text.to_lowercase().contains(keyword.as_str()) {
                    continue;
                }
                let words = self.words_right_of(doc.elements, i);
                if words.is_empty() {
                    continue;
                }
                let joined = words.join(" ");
                return Some(self.truncate_at_delimiter(&joined).trim().to_string());
            }
        }
        None
    }
}
