//! E-mail address extraction.

use std::collections::BTreeSet;

use crate::court::catalog::StrategyKind;
use crate::court::rules::patterns::EMAIL;
use crate::court::rules::text::char_len;
use crate::pdf::DocumentText;

use super::Strategy;

const MIN_EMAIL_CHARS: usize = 5;

/// Unique addresses in sorted order, joined by `", "`.
///
/// Deduplication is case-sensitive unless `domain_case_insensitive` is set,
/// in which case the domain part is lowercased first. Local parts are never
/// folded.
pub fn extract_emails(text: &str, domain_case_insensitive: bool) -> Option<String> {
    let unique: BTreeSet<String> = EMAIL
        .find_iter(text)
        .map(|m| {
            let email = m.as_str();
            match email.split_once('@') {
                Some((local, domain)) if domain_case_insensitive => {
                    format!("{}@{}", local, domain.to_lowercase())
                }
                _ => email.to_string(),
            }
        })
        .collect();

    let valid: Vec<String> = unique
        .into_iter()
        .filter(|email| {
            char_len(email) > MIN_EMAIL_CHARS
                && email
                    .split_once('@')
                    .is_some_and(|(_, domain)| domain.contains('.'))
        })
        .collect();

    (!valid.is_empty()).then(|| valid.join(", "))
}

pub struct EmailStrategy {
    domain_case_insensitive: bool,
}

impl EmailStrategy {
    pub fn new(domain_case_insensitive: bool) -> Self {
        Self {
            domain_case_insensitive,
        }
    }
}

impl Strategy for EmailStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Email
    }

    fn extract(&self, doc: &DocumentText<'_>) -> Option<String> {
        extract_emails(doc.text, self.domain_case_insensitive)
    }
}
