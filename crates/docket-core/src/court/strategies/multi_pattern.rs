//! Several weighted patterns competing for one field.

use regex::Regex;

use crate::court::catalog::{MultiPatternParams, StrategyKind};
use crate::court::rules::text::{char_len, window};
use crate::pdf::DocumentText;

use super::{Compiler, ExtractionCandidate, Strategy, best_match};

const INCIDENT_KEYWORDS: &[&str] = &["incident", "accident", "occurred", "happened", "facts"];
const LENGTH_BONUS: f64 = 0.1;
const CONTEXT_BONUS: f64 = 0.2;
const CONTEXT_RADIUS: usize = 100;

struct WeightedRegex {
    /// Position in the configured list, invalid entries included.
    index: usize,
    weight: f64,
    regex: Regex,
}

/// Score = `weight * (n - index) + 0.1 * len + 0.2 * incident keywords nearby`,
/// where `n` is the number of configured sub-patterns.
pub struct MultiPatternStrategy {
    patterns: Vec<WeightedRegex>,
    configured: usize,
}

impl MultiPatternStrategy {
    pub(crate) fn build(params: &MultiPatternParams, compiler: &mut Compiler<'_>) -> Self {
        let patterns = params
            .patterns
            .iter()
            .enumerate()
            .filter_map(|(index, p)| {
                compiler.compile(&p.regex).map(|regex| WeightedRegex {
                    index,
                    weight: p.weight,
                    regex,
                })
            })
            .collect();

        Self {
            patterns,
            configured: params.patterns.len(),
        }
    }

    fn context_bonus(text: &str, start: usize, end: usize) -> f64 {
        let context = window(text, start, end, CONTEXT_RADIUS, CONTEXT_RADIUS).to_lowercase();
        let hits = INCIDENT_KEYWORDS
            .iter()
            .filter(|k| context.contains(*k))
            .count();
        CONTEXT_BONUS * hits as f64
    }
}

impl Strategy for MultiPatternStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MultiPattern
    }

    fn extract(&self, doc: &DocumentText<'_>) -> Option<String> {
        let mut best: Option<ExtractionCandidate> = None;

        for pattern in &self.patterns {
            let priority = (self.configured - pattern.index) as f64;

            for caps in pattern.regex.captures_iter(doc.text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let text = best_match(&caps);
                if text.is_empty() {
                    continue;
                }

                let score = pattern.weight * priority
                    + LENGTH_BONUS * char_len(&text) as f64
                    + Self::context_bonus(doc.text, whole.start(), whole.end());

                if best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(ExtractionCandidate::new(text, score, whole.start()));
                }
            }
        }

        best.map(|c| c.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::court::catalog::{FieldPattern, WeightedPattern};
    use crate::court::strategies::dispatch;

    fn strategy(patterns: &[(&str, f64)]) -> Box<dyn Strategy> {
        let pattern = FieldPattern::MultiPattern(MultiPatternParams {
            patterns: patterns
                .iter()
                .map(|(regex, weight)| WeightedPattern {
                    regex: regex.to_string(),
                    weight: *weight,
                })
                .collect(),
        });
        dispatch("advanced_incident_date", &pattern).strategy.unwrap()
    }

    #[test]
    fn test_priority_outweighs_length() {
        let s = strategy(&[
            (r"on or about (\d{1,2}/\d{1,2}/\d{4})", 1.0),
            (r"([A-Z][a-z]+ \d{1,2}, \d{4})", 1.0),
        ]);
        // 2 + 0.8 for the first pattern against 1 + 1.1 for the second
        let doc = DocumentText::text_only("Filed May 2, 2024. On or about 3/1/2024 ...");
        assert_eq!(s.extract(&doc).as_deref(), Some("3/1/2024"));
    }

    #[test]
    fn test_incident_context_bonus() {
        let s = strategy(&[(r"\d{1,2}/\d{1,2}/\d{4}", 1.0)]);
        let text = format!("filed 5/10/2024 {} the accident occurred 3/1/2024", "x".repeat(200));
        assert_eq!(s.extract(&DocumentText::text_only(&text)).as_deref(), Some("3/1/2024"));
    }

    #[test]
    fn test_weight_scales_priority() {
        let s = strategy(&[(r"alpha", 1.0), (r"omega", 5.0)]);
        assert_eq!(
            s.extract(&DocumentText::text_only("alpha and omega")).as_deref(),
            Some("omega")
        );
    }

    #[test]
    fn test_invalid_sub_pattern_keeps_its_index() {
        // "(" does not compile but still counts toward the configured total
        let s = strategy(&[("(", 1.0), ("beta", 1.0)]);
        assert_eq!(s.extract(&DocumentText::text_only("beta")).as_deref(), Some("beta"));
    }
}
