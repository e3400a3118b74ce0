//! Candidate rules for receipt totals and VAT breakdowns.
//!
//! Each rule scans the whole normalized text for one layout and proposes at
//! most one [`ParseResult`]. Rules never look at each other's output; the
//! merger reconciles them afterwards.

pub mod inline_any;
pub mod inline_columns;
pub mod parenthetical;
pub mod payment_total;
pub mod total_ttc;
pub mod totals_line;
pub mod vertical;

pub use inline_any::InlineAnyRule;
pub use inline_columns::InlineColumnsRule;
pub use parenthetical::ParentheticalRule;
pub use payment_total::PaymentTotalRule;
pub use total_ttc::TotalTtcRule;
pub use totals_line::TotalsLineRule;
pub use vertical::VerticalBlocksRule;

use lazy_static::lazy_static;
use regex::Captures;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::tax::ParseResult;

use super::numeric::parse_amount;

/// A layout-specific amount rule.
pub trait AmountRule: Send + Sync {
    /// Stable identifier, also used as the provenance note.
    fn name(&self) -> &'static str;

    /// Informational ordering. Selection between candidates is confidence based.
    fn priority(&self) -> u8;

    /// Propose a reading of `text`, or `None` when the layout is absent.
    fn apply(&self, text: &str) -> Option<ParseResult>;
}

lazy_static! {
    static ref RULES: Vec<Box<dyn AmountRule>> = vec![
        Box::new(ParentheticalRule),
        Box::new(InlineColumnsRule),
        Box::new(VerticalBlocksRule),
        Box::new(InlineAnyRule),
        Box::new(TotalsLineRule),
        Box::new(TotalTtcRule),
        Box::new(PaymentTotalRule),
    ];
}

/// The registered rules, in priority order.
pub fn amount_rules() -> &'static [Box<dyn AmountRule>] {
    &RULES
}

/// Parse capture group `index` as an amount. A missing group or a
/// `NotANumber` failure is logged and yields `None`, so the caller can skip the
/// match.
pub(crate) fn capture_amount(rule: &str, caps: &Captures<'_>, index: usize) -> Option<Decimal> {
    let raw = caps.get(index)?.as_str();
    match parse_amount(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("{}: skipping match, {}", rule, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        let names: Vec<&str> = amount_rules().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "parenthetical",
                "inline_columns",
                "vertical_blocks",
                "inline_any",
                "totals_line",
                "total_ttc",
                "payment_total",
            ]
        );
    }

    #[test]
    fn test_registry_priorities_descend() {
        let priorities: Vec<u8> = amount_rules().iter().map(|r| r.priority()).collect();
        assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_no_rule_matches_plain_text() {
        let text = "MERCI DE VOTRE VISITE\nA BIENTOT";
        assert!(amount_rules().iter().all(|r| r.apply(text).is_none()));
    }
}
