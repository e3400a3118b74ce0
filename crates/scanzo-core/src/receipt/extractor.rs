//! The extraction pass: every registered rule over the same text.

use tracing::{debug, info};

use crate::models::tax::{MergedResult, ParseResult};

use super::merger::Merger;
use super::rules::{AmountRule, amount_rules};

/// Runs the rule registry over normalized text.
pub struct AmountsExtractor {
    rules: &'static [Box<dyn AmountRule>],
    merger: Merger,
}

impl AmountsExtractor {
    pub fn new() -> Self {
        Self {
            rules: amount_rules(),
            merger: Merger::new(),
        }
    }

    /// Use a custom merger.
    pub fn with_merger(mut self, merger: Merger) -> Self {
        self.merger = merger;
        self
    }

    /// All non-empty candidates, in registry order.
    pub fn extract(&self, text: &str) -> Vec<ParseResult> {
        let candidates: Vec<ParseResult> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let candidate = rule.apply(text);
                match &candidate {
                    Some(c) => debug!("rule {} proposed confidence {}", rule.name(), c.confidence),
                    None => debug!("rule {} found nothing", rule.name()),
                }
                candidate
            })
            .collect();

        info!("{} of {} rules produced a candidate", candidates.len(), self.rules.len());
        candidates
    }

    /// Extraction pass followed by the merger.
    pub fn merged(&self, text: &str) -> Option<MergedResult> {
        self.merger.merge(&self.extract(text))
    }
}

impl Default for AmountsExtractor {
    fn default() -> Self {
        Self::new()
    }
}
