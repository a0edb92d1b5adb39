//! Every distinct date in the document, ranked by incident context.
//!
//! Output is a summary such as
//! `"March 1, 2024 (collision, injured) | June 2, 2024"`: the top three dates,
//! each followed by up to two of the indicators found around it.

use std::collections::HashSet;

use regex::Regex;

use crate::court::catalog::{MultiDateParams, StrategyKind};
use crate::court::rules::dates::{is_bare_numeric_date, to_standard_date};
use crate::court::rules::text::window;
use crate::pdf::DocumentText;

use super::{Compiler, Strategy};

const TOP_DATES: usize = 3;
const SHOWN_INDICATORS: usize = 2;
pub(crate) const SUMMARY_SEPARATOR: &str = " | ";

struct FoundDate<'t> {
    text: &'t str,
    position: usize,
    indicators: Vec<&'t str>,
}

pub struct MultiDateStrategy {
    date_patterns: Vec<Regex>,
    context_radius: usize,
    incident_indicators: Vec<String>,
}

impl MultiDateStrategy {
    pub(crate) fn build(params: &MultiDateParams, compiler: &mut Compiler<'_>) -> Self {
        Self {
            date_patterns: compiler.compile_all(&params.date_patterns),
            context_radius: params.context_radius,
            incident_indicators: params
                .incident_indicators
                .iter()
                .filter(|i| !i.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Distinct non-bare dates in pattern order, then text order.
    fn find_dates<'t>(&'t self, text: &'t str) -> Vec<FoundDate<'t>> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for pattern in &self.date_patterns {
            for m in pattern.find_iter(text) {
                let date_text = m.as_str();
                if is_bare_numeric_date(date_text) {
                    continue;
                }
                if let Some(standard) = to_standard_date(date_text) {
                    if !seen.insert(standard) {
                        continue;
                    }
                }

                let context = window(text, m.start(), m.end(), self.context_radius, self.context_radius)
                    .to_lowercase();
                let indicators = self
                    .incident_indicators
                    .iter()
                    .filter(|i| context.contains(&i.to_lowercase()))
                    .map(String::as_str)
                    .collect();

                found.push(FoundDate {
                    text: date_text,
                    position: m.start(),
                    indicators,
                });
            }
        }
        found
    }
}

impl Strategy for MultiDateStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MultiDate
    }

    fn extract(&self, doc: &DocumentText<'_>) -> Option<String> {
        let mut dates = self.find_dates(doc.text);
        if dates.is_empty() {
            return None;
        }
        dates.sort_by(|a, b| {
            b.indicators
                .len()
                .cmp(&a.indicators.len())
                .then(a.position.cmp(&b.position))
        });

        let summary = dates
            .iter()
            .take(TOP_DATES)
            .map(|d| {
                if d.indicators.is_empty() {
                    d.text.to_string()
                } else {
                    let shown = &d.indicators[..d.indicators.len().min(SHOWN_INDICATORS)];
                    format!("{} ({})", d.text, shown.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join(SUMMARY_SEPARATOR);

        Some(summary)
    }
}
