//! VAT table with one row per rate.
//!
//! ```text
//! CODE   Taux    TVA     HT      TTC
//! B      10.00%  2,44    24,36   26,80
//! ```

use tracing::{debug, trace};

use crate::models::tax::{ParseResult, TaxRow};
use crate::receipt::patterns::{COLUMNS_HEADER, COLUMNS_ROW};

use super::{AmountRule, capture_amount};

pub struct InlineColumnsRule;

impl InlineColumnsRule {
    fn parse_row(&self, line: &str) -> Option<TaxRow> {
        let caps = COLUMNS_ROW.captures(line)?;
        let rate = capture_amount(self.name(), &caps, 1)?;
        let tva = capture_amount(self.name(), &caps, 2)?;
        let ht = capture_amount(self.name(), &caps, 3)?;
        let ttc = capture_amount(self.name(), &caps, 4)?;

        let row = TaxRow::reconciled(Some(rate), ht, tva, ttc);
        if row.is_none() {
            trace!("{}: inconsistent row {:?}", self.name(), line);
        }
        row
    }
}

impl AmountRule for InlineColumnsRule {
    fn name(&self) -> &'static str {
        "inline_columns"
    }

    fn priority(&self) -> u8 {
        68
    }

    fn apply(&self, text: &str) -> Option<ParseResult> {
        let mut rows = Vec::new();
        let mut in_table = false;

        for line in text.lines().map(str::trim) {
            if !in_table {
                in_table = COLUMNS_HEADER.is_match(line);
                continue;
            }

            if !COLUMNS_ROW.is_match(line) {
                // The table ends at the first non-row line once rows were read.
                if !rows.is_empty() {
                    break;
                }
                continue;
            }

            if let Some(row) = self.parse_row(line) {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return None;
        }

        debug!("{}: {} rows", self.name(), rows.len());
        Some(ParseResult::summing_rows(0.90, self.name(), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_two_rows_same_rate() {
        let text = "\
PARADIS DU FRUIT
CODE  Taux    TVA    HT     TTC
A     10.00%  5,05   50,55  55,60
B     10.00%  2,21   22,09  24,30
TOTAL TTC 79,90";

        let result = InlineColumnsRule.apply(text).unwrap();
        assert_eq!(result.tax_rows.len(), 2);
        assert_eq!(result.total_ht, Some(d("72.64")));
        assert_eq!(result.total_tva, Some(d("7.26")));
        assert_eq!(result.total_ttc, Some(d("79.90")));
        assert_eq!(result.confidence, 0.90);
        assert!(result.tax_rows.iter().all(|r| r.rate == Some(Decimal::TEN)));
    }

    #[test]
    fn test_single_row() {
        let text = "Code Taux TVA HT TTC\nB 10.00% 2,44 24,36 26,80\nMERCI";
        let result = InlineColumnsRule.apply(text).unwrap();
        assert_eq!(result.tax_rows.len(), 1);
        assert_eq!(result.tax_rows[0].base_ht, Some(d("24.36")));
        assert_eq!(result.tax_rows[0].tva, Some(d("2.44")));
        assert_eq!(result.tax_rows[0].ttc, Some(d("26.80")));
    }

    #[test]
    fn test_table_ends_at_first_foreign_line() {
        let text = "\
Code Taux TVA HT TTC
A 20% 2,00 10,00 12,00
Merci de votre visite
B 10% 1,00 10,00 11,00";
        let result = InlineColumnsRule.apply(text).unwrap();
        assert_eq!(result.tax_rows.len(), 1);
        assert_eq!(result.total_ttc, Some(d("12.00")));
    }

    #[test]
    fn test_rows_without_header_are_ignored() {
        let text = "B 10.00% 2,44 24,36 26,80";
        assert!(InlineColumnsRule.apply(text).is_none());
    }
}
