//! Totals printed as a vertical block: labels on one or two lines, then one
//! amount per line.
//!
//! ```text
//! Mt. TVA   Base HT   Base TTC
//! 3,00
//! 30,00
//! 33,00
//! ```
//!
//! Around every anchor line the rule infers the column order from the labels
//! nearby, then slides a three-value window over the standalone amounts that
//! follow and keeps every window that reads as a consistent (HT, TVA, TTC).

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::tax::{ParseResult, TaxRow};
use crate::receipt::numeric::{almost_eq, amount_tolerance, parse_amount, q2};
use crate::receipt::patterns::{NUMBER_LINE, RATE_HINT, VERTICAL_ANCHOR};

use super::AmountRule;

/// Lines scanned after an anchor.
const SCAN_AHEAD: usize = 40;
/// Lines scanned before an anchor.
const SCAN_BEHIND: usize = 2;

/// Canonical column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Ht,
    Tva,
    Ttc,
}

/// Printed labels and the column they name, most specific first.
const LABELS: [(&str, Column); 7] = [
    ("mt. tva", Column::Tva),
    ("montant tva", Column::Tva),
    ("tva", Column::Tva),
    ("base ht", Column::Ht),
    ("ht", Column::Ht),
    ("base ttc", Column::Ttc),
    ("ttc", Column::Ttc),
];

/// Implied tax ratio must lie in [0.5%, 30%].
fn ratio_ok(tva: Decimal, ht: Decimal) -> bool {
    if ht.is_zero() {
        return false;
    }
    let ratio = tva / ht;
    ratio >= Decimal::new(5, 3) && ratio <= Decimal::new(30, 2)
}

/// Generic assignment when the labels are unusable: the two first values add up
/// to the third, the larger one is the base.
fn generic_triplet(a: Decimal, b: Decimal, c: Decimal) -> Option<(Decimal, Decimal, Decimal)> {
    if !almost_eq(a + b, c, amount_tolerance()) {
        return None;
    }

    let (h1, t1) = if a >= b { (a, b) } else { (b, a) };
    if ratio_ok(t1, h1) {
        return Some((h1, t1, c));
    }
    if ratio_ok(a, b) {
        return Some((b, a, c));
    }
    Some((a, b, c))
}

/// Order of the HT/TVA/TTC labels printed around line `i`.
fn header_order(lines: &[&str], i: usize) -> Vec<Column> {
    let start = i.saturating_sub(2);
    let end = (i + 3).min(lines.len());
    let window = lines[start..end].join(" ").to_lowercase();

    let mut found: Vec<(usize, Column)> = LABELS
        .iter()
        .filter_map(|(label, column)| window.find(label).map(|pos| (pos, *column)))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);

    let mut order = Vec::with_capacity(3);
    for (_, column) in found {
        if !order.contains(&column) {
            order.push(column);
        }
    }
    order
}

/// Map three consecutive values onto the inferred column order.
fn ordered_triplet(order: &[Column], values: [Decimal; 3]) -> Option<(Decimal, Decimal, Decimal)> {
    if order.len() < 3 {
        return None;
    }

    let pick = |column: Column| {
        order
            .iter()
            .position(|c| *c == column)
            .map(|index| values[index])
    };
    let (ht, tva, ttc) = (pick(Column::Ht)?, pick(Column::Tva)?, pick(Column::Ttc)?);

    (almost_eq(ht + tva, ttc, amount_tolerance()) && ratio_ok(tva, ht)).then_some((ht, tva, ttc))
}

pub struct VerticalBlocksRule;

impl AmountRule for VerticalBlocksRule {
    fn name(&self) -> &'static str {
        "vertical_blocks"
    }

    fn priority(&self) -> u8 {
        66
    }

    fn apply(&self, text: &str) -> Option<ParseResult> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let anchors: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| VERTICAL_ANCHOR.is_match(line))
            .map(|(i, _)| i)
            .collect();
        if anchors.is_empty() {
            return None;
        }

        let mut seen_lines: HashSet<[usize; 3]> = HashSet::new();
        let mut seen_values: HashSet<[Decimal; 3]> = HashSet::new();
        let mut triplets: Vec<(Option<Decimal>, Decimal, Decimal, Decimal)> = Vec::new();

        for &anchor in &anchors {
            let order = header_order(&lines, anchor);
            let mut last_rate: Option<Decimal> = None;
            let mut window: Vec<(usize, Decimal)> = Vec::new();

            let end = (anchor + SCAN_AHEAD).min(lines.len());
            for j in anchor.saturating_sub(SCAN_BEHIND)..end {
                let line = lines[j];

                if let Some(caps) = RATE_HINT.captures(line) {
                    if let Ok(rate) = parse_amount(&caps[1]) {
                        last_rate = Some(rate);
                    }
                }

                let Some(caps) = NUMBER_LINE.captures(line) else {
                    // A blank line ends the current run of amounts.
                    if line.is_empty() {
                        window.clear();
                    }
                    continue;
                };
                let Ok(value) = parse_amount(&caps[1]) else {
                    continue;
                };
                window.push((j, value));

                if window.len() < 3 {
                    continue;
                }
                let [(i1, v1), (i2, v2), (i3, v3)] = [
                    window[window.len() - 3],
                    window[window.len() - 2],
                    window[window.len() - 1],
                ];
                if seen_lines.contains(&[i1, i2, i3]) {
                    continue;
                }

                let Some((ht, tva, ttc)) = ordered_triplet(&order, [v1, v2, v3])
                    .or_else(|| generic_triplet(v1, v2, v3))
                else {
                    continue;
                };

                let key = [q2(ht), q2(tva), q2(ttc)];
                if seen_values.insert(key) {
                    trace!("{}: lines {}..={} -> {:?}", self.name(), i1, i3, key);
                    seen_lines.insert([i1, i2, i3]);
                    triplets.push((last_rate, ht, tva, ttc));
                }
            }
        }

        let mut rows: Vec<TaxRow> = Vec::new();
        for (rate, ht, tva, ttc) in triplets {
            if !ratio_ok(tva, ht) || !almost_eq(ht + tva, ttc, amount_tolerance()) {
                continue;
            }
            let Some(row) = TaxRow::reconciled(rate, ht, tva, ttc) else {
                continue;
            };
            if !rows.iter().any(|r| r.amount_key() == row.amount_key()) {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return None;
        }

        let confidence = if rows.len() > 1 { 0.85 } else { 0.80 };
        debug!("{}: {} rows", self.name(), rows.len());
        Some(ParseResult::summing_rows(confidence, self.name(), rows))
    }
}
