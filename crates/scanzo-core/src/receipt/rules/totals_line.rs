//! Labelled totals lines: `TOTAL HT`, `TOTAL TVA`, `TOTAL TTC`.
//!
//! The first occurrence of each label wins. Used as a fallback and as a source
//! of totals the table rules did not print.

use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::tax::ParseResult;
use crate::receipt::patterns::{TOTAL_HT, TOTAL_TTC, TOTAL_TVA};

use super::{AmountRule, capture_amount};

pub struct TotalsLineRule;

impl TotalsLineRule {
    fn first_amount(&self, pattern: &Regex, text: &str) -> Option<Decimal> {
        let caps = pattern.captures(text)?;
        capture_amount(self.name(), &caps, 1)
    }
}

impl AmountRule for TotalsLineRule {
    fn name(&self) -> &'static str {
        "totals_line"
    }

    fn priority(&self) -> u8 {
        50
    }

    fn apply(&self, text: &str) -> Option<ParseResult> {
        let ttc = self.first_amount(&TOTAL_TTC, text);
        let ht = self.first_amount(&TOTAL_HT, text);
        let tva = self.first_amount(&TOTAL_TVA, text);

        if ht.is_none() && tva.is_none() && ttc.is_none() {
            return None;
        }

        debug!("{}: ht={:?} tva={:?} ttc={:?}", self.name(), ht, tva, ttc);
        Some(ParseResult::new(0.70, self.name()).with_totals(ht, tva, ttc))
    }
}
