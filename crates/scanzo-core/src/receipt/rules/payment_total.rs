//! The amount charged to a payment method, read as the gross total.
//!
//! `CB: 26,80 €`, `CARTE BLEUE 26,80`

use tracing::debug;

use crate::models::tax::ParseResult;
use crate::receipt::patterns::PAYMENT_AMOUNT;

use super::{AmountRule, capture_amount};

pub struct PaymentTotalRule;

impl AmountRule for PaymentTotalRule {
    fn name(&self) -> &'static str {
        "payment_total"
    }

    fn priority(&self) -> u8 {
        40
    }

    fn apply(&self, text: &str) -> Option<ParseResult> {
        let caps = PAYMENT_AMOUNT.captures(text)?;
        let ttc = capture_amount(self.name(), &caps, 2)?;

        debug!("{}: {} paid by {:?}", self.name(), ttc, &caps[1]);
        Some(ParseResult::new(0.50, self.name()).with_totals(None, None, Some(ttc)))
    }
}
