//! Date near a facts keyword.

use regex::Regex;

use crate::court::catalog::{FactsParams, StrategyKind};
use crate::court::rules::text::{find_ci, window};
use crate::pdf::DocumentText;

use super::{Compiler, Strategy};

const BEFORE_KEYWORD: usize = 50;
const AFTER_KEYWORD: usize = 200;

pub struct FactsDateStrategy {
    keywords: Vec<String>,
    date_regex: Regex,
}

impl FactsDateStrategy {
    pub(crate) fn build(params: &FactsParams, compiler: &mut Compiler<'_>) -> Option<Self> {
        let date_regex = compiler.compile(&params.date_regex)?;
        Some(Self {
            keywords: params
                .keywords
                .iter()
                .filter(|k| !k.is_empty())
                .cloned()
                .collect(),
            date_regex,
        })
    }
}

impl Strategy for FactsDateStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FactsPattern
    }

    fn extract(&self, doc: &DocumentText<'_>) -> Option<String> {
        for keyword in &self.keywords {
            let Some(pos) = find_ci(doc.text, keyword, 0) else {
                continue;
            };
            let search = window(doc.text, pos, pos, BEFORE_KEYWORD, AFTER_KEYWORD);
            if let Some(caps) = self.date_regex.captures(search) {
                let value = caps.get(1).or_else(|| caps.get(0))?;
                return Some(value.as_str().to_string());
            }
        }
        None
    }
}
