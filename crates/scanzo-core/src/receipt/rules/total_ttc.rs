//! A bare `TTC` amount, with or without a `TOTAL` prefix.

use tracing::debug;

use crate::models::tax::ParseResult;
use crate::receipt::patterns::TTC_ALONE;

use super::{AmountRule, capture_amount};

pub struct TotalTtcRule;

impl AmountRule for TotalTtcRule {
    fn name(&self) -> &'static str {
        "total_ttc"
    }

    fn priority(&self) -> u8 {
        45
    }

    fn apply(&self, text: &str) -> Option<ParseResult> {
        let caps = TTC_ALONE.captures(text)?;
        let ttc = capture_amount(self.name(), &caps, 1)?;

        debug!("{}: {}", self.name(), ttc);
        Some(ParseResult::new(0.55, self.name()).with_totals(None, None, Some(ttc)))
    }
}
