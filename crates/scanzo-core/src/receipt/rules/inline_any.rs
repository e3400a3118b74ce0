//! Free-form "TVA" lines carrying two or more amounts in no fixed order.
//!
//! Outliers are dropped with a median-absolute-deviation filter, then every
//! consecutive three-value window and every reconstructed pair is scored. An
//! implausible implied rate only raises the score; a triplet is rejected when
//! `HT + TVA` misses `TTC` by more than 1.00. When nothing is kept, or the kept
//! triplet is loose, the two smallest values are checked against a TOTAL
//! printed a few lines below.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::tax::{ParseResult, TaxRow};
use crate::receipt::numeric::{max_row_residual, parse_amount, q2};
use crate::receipt::patterns::{HAS_TVA, PERCENT_RATE, TOTAL_LABEL};

use super::AmountRule;

/// Outliers further than this many MADs from the median are dropped.
const MAD_FACTOR: i64 = 12;
/// Lines searched below a TVA line for a matching TOTAL.
const TOTAL_LOOKAHEAD: usize = 8;

type Triplet = (Decimal, Decimal, Decimal);

/// Two-decimal amounts in `line`: 1 to 9 integer digits, a `.` or `,`, exactly
/// two decimals, not touching any other digit.
fn grab_amounts(line: &str) -> Vec<Decimal> {
    let bytes = line.as_bytes();
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    let mut amounts = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !digit_at(i) || (i > 0 && digit_at(i - 1)) {
            i += 1;
            continue;
        }

        let mut sep = i;
        while digit_at(sep) {
            sep += 1;
        }
        let int_len = sep - i;
        let end = sep + 3;
        let well_formed = (1..=9).contains(&int_len)
            && matches!(bytes.get(sep), Some(b'.' | b','))
            && digit_at(sep + 1)
            && digit_at(sep + 2)
            && !digit_at(end);

        if !well_formed {
            i = sep;
            continue;
        }

        match parse_amount(&line[i..end]) {
            Ok(value) => amounts.push(value),
            Err(e) => trace!("inline_any: {}", e),
        }
        i = end;
    }

    amounts
}

fn median(values: &[Decimal]) -> Decimal {
    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / Decimal::TWO
    } else {
        sorted[mid]
    }
}

/// Drop values lying abnormally far from the line's center.
fn mad_filter(values: &[Decimal]) -> Vec<Decimal> {
    if values.len() < 3 {
        return values.to_vec();
    }

    let center = median(values);
    let deviations: Vec<Decimal> = values.iter().map(|v| (*v - center).abs()).collect();
    let mad = median(&deviations);
    if mad.is_zero() {
        return values.to_vec();
    }

    let limit = Decimal::from(MAD_FACTOR);
    values
        .iter()
        .copied()
        .filter(|v| (*v - center).abs() / mad <= limit)
        .collect()
}

/// Penalty for an implied rate outside [1%, 25%], used when no rate is printed.
fn implicit_rate_penalty(ht: Decimal, tva: Decimal) -> Decimal {
    let base_penalty = Decimal::new(500, 2);
    if ht <= Decimal::ZERO {
        return base_penalty;
    }

    let rate = tva * Decimal::ONE_HUNDRED / ht;
    if rate < Decimal::ONE || rate > Decimal::new(25, 0) {
        base_penalty + (rate - Decimal::new(13, 0)).abs() / Decimal::TEN
    } else {
        Decimal::ZERO
    }
}

fn score((ht, tva, ttc): Triplet, rate: Option<Decimal>) -> Decimal {
    let mut score = (ht + tva - ttc).abs();
    match rate {
        Some(rate) if ht > Decimal::ZERO => {
            score += (tva - q2(ht * rate / Decimal::ONE_HUNDRED)).abs();
        }
        Some(_) => {}
        None => score += implicit_rate_penalty(ht, tva),
    }
    score
}

/// Every triplet readable from `values`: consecutive windows first, then each
/// ordered pair completed as (HT, TTC), (TVA, TTC) or (HT, TVA).
fn candidate_triplets(values: &[Decimal]) -> Vec<Triplet> {
    let mut candidates: Vec<Triplet> = values.windows(3).map(|w| (w[0], w[1], w[2])).collect();

    for (i, &a) in values.iter().enumerate() {
        for (j, &b) in values.iter().enumerate() {
            if i == j {
                continue;
            }
            if b > a {
                candidates.push((a, q2(b - a), b));
                candidates.push((q2(b - a), a, b));
            }
            candidates.push((a, b, q2(a + b)));
        }
    }

    candidates
}

/// Lowest-scoring triplet; the first one wins ties.
fn best_triplet(values: &[Decimal], rate: Option<Decimal>) -> Option<Triplet> {
    if values.len() < 2 {
        return None;
    }

    let mut best: Option<(Triplet, Decimal)> = None;
    for triplet in candidate_triplets(values) {
        let s = score(triplet, rate);
        if best.is_none_or(|(_, best_score)| s < best_score) {
            best = Some((triplet, s));
        }
    }
    best.map(|(triplet, _)| triplet)
}

fn residual((ht, tva, ttc): Triplet) -> Decimal {
    (ht + tva - ttc).abs()
}

/// Residual above which a TOTAL printed below is tried before the triplet.
fn reconcile_threshold() -> Decimal {
    Decimal::new(20, 2)
}

pub struct InlineAnyRule;

impl InlineAnyRule {
    /// Pair the two smallest values (larger as HT) with the last amount of a
    /// TOTAL line found shortly below `idx`.
    fn reconcile_with_total(
        &self,
        lines: &[&str],
        idx: usize,
        values: &[Decimal],
        rate: Option<Decimal>,
    ) -> Option<ParseResult> {
        let mut sorted = values.to_vec();
        sorted.sort();
        let (tva, ht) = (*sorted.first()?, *sorted.get(1)?);

        for line in lines.iter().skip(idx + 1).take(TOTAL_LOOKAHEAD) {
            if !TOTAL_LABEL.is_match(line) {
                continue;
            }
            let Some(&ttc) = grab_amounts(line).last() else {
                continue;
            };
            if let Some(row) = TaxRow::reconciled(rate, ht, tva, ttc) {
                debug!("{}: reconciled with total {:?}", self.name(), line);
                return Some(
                    ParseResult::new(0.93, self.name())
                        .with_note("reconciled_total")
                        .with_totals(row.base_ht, row.tva, row.ttc)
                        .with_rows(vec![row]),
                );
            }
        }
        None
    }
}

impl AmountRule for InlineAnyRule {
    fn name(&self) -> &'static str {
        "inline_any"
    }

    fn priority(&self) -> u8 {
        65
    }

    fn apply(&self, text: &str) -> Option<ParseResult> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        for (idx, line) in lines.iter().enumerate() {
            if !HAS_TVA.is_match(line) {
                continue;
            }

            let rate = PERCENT_RATE
                .captures(line)
                .and_then(|caps| parse_amount(&caps[1]).ok());

            let values = mad_filter(&grab_amounts(line));
            if values.len() < 2 {
                continue;
            }

            let triplet =
                best_triplet(&values, rate).filter(|t| residual(*t) <= max_row_residual());
            trace!("{}: line {} best {:?}", self.name(), idx, triplet);

            if triplet.is_none_or(|t| residual(t) > reconcile_threshold()) {
                if let Some(result) = self.reconcile_with_total(&lines, idx, &values, rate) {
                    return Some(result);
                }
            }

            let Some((ht, tva, ttc)) = triplet else {
                continue;
            };

            if let Some(row) = TaxRow::reconciled(rate, ht, tva, ttc) {
                debug!("{}: matched {:?}", self.name(), line);
                return Some(
                    ParseResult::new(0.90, self.name())
                        .with_totals(row.base_ht, row.tva, row.ttc)
                        .with_rows(vec![row]),
                );
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_grab_amounts() {
        assert_eq!(
            grab_amounts("TVA 10% 11,82 1,18 13.00"),
            vec![d("11.82"), d("1.18"), d("13.00")]
        );
        assert_eq!(grab_amounts("1.234,56"), vec![d("234.56")]);
        assert!(grab_amounts("12,345 1234567890,12").is_empty());
        assert!(grab_amounts("TVA 10%").is_empty());
    }

    #[test]
    fn test_mad_filter_drops_outlier() {
        let values = vec![d("24.36"), d("2.44"), d("26.80"), d("9999.00")];
        let filtered = mad_filter(&values);
        assert_eq!(filtered, vec![d("24.36"), d("2.44"), d("26.80")]);
    }

    #[test]
    fn test_mad_filter_keeps_short_lists() {
        let values = vec![d("1.00"), d("9999.00")];
        assert_eq!(mad_filter(&values), values);
    }

    #[test]
    fn test_printed_rate_line() {
        let text = "PARIS ISTANBUL\nTVA 10% 11,82 1,18 13,00\nMERCI";
        let result = InlineAnyRule.apply(text).unwrap();
        assert_eq!(result.total_ht, Some(d("11.82")));
        assert_eq!(result.total_tva, Some(d("1.18")));
        assert_eq!(result.total_ttc, Some(d("13.00")));
        assert_eq!(result.tax_rows[0].rate, Some(Decimal::TEN));
        assert_eq!(result.confidence, 0.90);
    }

    #[test]
    fn test_pair_only_line() {
        let text = "TVA 20% 100,00 120,00";
        let result = InlineAnyRule.apply(text).unwrap();
        assert_eq!(result.total_ht, Some(d("100.00")));
        assert_eq!(result.total_tva, Some(d("20.00")));
        assert_eq!(result.total_ttc, Some(d("120.00")));
    }

    #[test]
    fn test_without_printed_rate() {
        let text = "TVA 24,36 2,44 26,80";
        let result = InlineAnyRule.apply(text).unwrap();
        assert_eq!(result.total_ht, Some(d("24.36")));
        assert_eq!(result.tax_rows[0].rate, Some(Decimal::TEN));
    }

    #[test]
    fn test_implausible_rate_is_penalized_not_rejected() {
        let result = InlineAnyRule.apply("TVA 0,45 50,00").unwrap();
        assert_eq!(result.total_ht, Some(d("49.55")));
        assert_eq!(result.total_tva, Some(d("0.45")));
        assert_eq!(result.total_ttc, Some(d("50.00")));
        assert_eq!(result.confidence, 0.90);
        assert!(!result.notes.contains("reconciled_total"));
    }

    #[test]
    fn test_reconciles_with_total_below() {
        let text = "TVA 0,45 50,00\nCB\nTOTAL 50,45";
        let lines: Vec<&str> = text.lines().collect();
        let values = grab_amounts(lines[0]);
        let result = InlineAnyRule
            .reconcile_with_total(&lines, 0, &values, None)
            .unwrap();
        assert_eq!(result.confidence, 0.93);
        assert!(result.notes.contains("reconciled_total"));
        assert_eq!(result.tax_rows[0].rate, Some(d("0.9")));
        assert_eq!(result.total_ht, Some(d("50.00")));
        assert_eq!(result.total_tva, Some(d("0.45")));
        assert_eq!(result.total_ttc, Some(d("50.45")));

        let far = "TVA 0,45 50,00\nA\nB\nC\nD\nE\nF\nG\nH\nTOTAL 50,45";
        let lines: Vec<&str> = far.lines().collect();
        assert!(InlineAnyRule.reconcile_with_total(&lines, 0, &values, None).is_none());
    }

    #[test]
    fn test_needs_two_amounts() {
        assert!(InlineAnyRule.apply("TVA 10% 3,00").is_none());
        assert!(InlineAnyRule.apply("TOTAL 3,00 30,00").is_none());
    }
}
