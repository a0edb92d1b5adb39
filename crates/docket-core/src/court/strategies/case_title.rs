//! Case style line, e.g. "Jane Roe vs. Acme Freight, Inc.".

use crate::court::catalog::{CaseTitleParams, StrategyKind};
use crate::court::rules::patterns::CASE_NUMBER;
use crate::court::rules::text::{char_len, window};
use crate::pdf::DocumentText;

use super::Strategy;

const TITLE_RADIUS: usize = 100;
const MIN_TITLE_CHARS: usize = 5;

/// Keyword matching is case-sensitive so "v." does not fire on every "V.".
pub struct CaseTitleStrategy {
    keywords: Vec<String>,
}

impl CaseTitleStrategy {
    pub fn new(params: &CaseTitleParams) -> Self {
        Self {
            keywords: params
                .keywords
                .iter()
                .filter(|k| !k.is_empty())
                .cloned()
                .collect(),
        }
    }
}

impl Strategy for CaseTitleStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CaseTitle
    }

    fn extract(&self, doc: &DocumentText<'_>) -> Option<String> {
        for keyword in &self.keywords {
            let Some(pos) = doc.text.find(keyword.as_str()) else {
                continue;
            };
            let segment = window(doc.text, pos, pos, TITLE_RADIUS, TITLE_RADIUS);

            for line in segment.split('\n').filter(|l| l.contains(keyword.as_str())) {
                let title = CASE_NUMBER.replace_all(line.trim(), "");
                let title = title.trim();
                if char_len(title) > MIN_TITLE_CHARS {
                    return Some(title.to_string());
                }
            }
        }
        None
    }
}
