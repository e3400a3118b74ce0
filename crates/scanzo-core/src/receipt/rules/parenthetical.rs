//! Single-line rate summary with the base and gross in parentheses.
//!
//! `10% : 6,95 € (69,55 € HT / 76,50 € TTC)`

use tracing::debug;

use crate::models::tax::{ParseResult, TaxRow};
use crate::receipt::patterns::PARENTHETICAL;

use super::{AmountRule, capture_amount};

pub struct ParentheticalRule;

impl AmountRule for ParentheticalRule {
    fn name(&self) -> &'static str {
        "parenthetical"
    }

    fn priority(&self) -> u8 {
        70
    }

    fn apply(&self, text: &str) -> Option<ParseResult> {
        for caps in PARENTHETICAL.captures_iter(text) {
            let (Some(rate), Some(tva), Some(ht), Some(ttc)) = (
                capture_amount(self.name(), &caps, 1),
                capture_amount(self.name(), &caps, 2),
                capture_amount(self.name(), &caps, 3),
                capture_amount(self.name(), &caps, 4),
            ) else {
                continue;
            };

            let Some(row) = TaxRow::reconciled(Some(rate), ht, tva, ttc) else {
                debug!("{}: rejecting {} + {} != {}", self.name(), ht, tva, ttc);
                continue;
            };

            debug!("{}: matched {:?}", self.name(), &caps[0]);
            return Some(
                ParseResult::new(0.95, self.name())
                    .with_totals(row.base_ht, row.tva, row.ttc)
                    .with_rows(vec![row]),
            );
        }

        None
    }
}
