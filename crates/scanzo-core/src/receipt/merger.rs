//! Reconciles the candidates of one extraction pass into a single reading.

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::tax::{AmountKey, MergedResult, ParseResult, TaxRow};

use super::numeric::q2;

/// Candidate merger.
///
/// The base candidate is the most confident one carrying a gross total. Its
/// missing totals are backfilled from the other candidates in descending
/// confidence order, tax rows from every candidate are pooled and deduplicated
/// by amounts, and when exactly two totals are known the third is derived.
#[derive(Debug, Clone)]
pub struct Merger {
    derive_missing_totals: bool,
}

impl Merger {
    pub fn new() -> Self {
        Self {
            derive_missing_totals: true,
        }
    }

    /// Toggle the algebraic completion of a missing total.
    pub fn with_derivation(mut self, derive: bool) -> Self {
        self.derive_missing_totals = derive;
        self
    }

    /// Merge `candidates`, or `None` when there are none.
    pub fn merge(&self, candidates: &[ParseResult]) -> Option<MergedResult> {
        let base = select_base(candidates)?;

        let mut by_confidence: Vec<&ParseResult> = candidates.iter().collect();
        // stable: equal confidences keep registry order
        by_confidence.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut total_ht = base.total_ht;
        let mut total_tva = base.total_tva;
        let mut total_ttc = base.total_ttc;
        for candidate in &by_confidence {
            total_ttc = total_ttc.or(candidate.total_ttc);
            total_ht = total_ht.or(candidate.total_ht);
            total_tva = total_tva.or(candidate.total_tva);
        }

        let rows = dedup_rows(
            base.tax_rows
                .iter()
                .chain(by_confidence.iter().flat_map(|c| c.tax_rows.iter())),
        );

        if self.derive_missing_totals {
            (total_ht, total_tva, total_ttc) = derive_third(total_ht, total_tva, total_ttc);
        }

        let confidence = candidates
            .iter()
            .map(|c| c.confidence)
            .fold(0.0_f32, f32::max)
            .min(1.0);
        let notes = candidates
            .iter()
            .flat_map(|c| c.notes.iter().cloned())
            .collect();

        debug!(
            "merged {} candidates: ht={:?} tva={:?} ttc={:?} rows={} confidence={}",
            candidates.len(),
            total_ht,
            total_tva,
            total_ttc,
            rows.len(),
            confidence
        );

        Some(MergedResult {
            total_ht,
            total_ttc,
            total_tva,
            tax_rows: rows,
            confidence,
            notes,
        })
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

/// First candidate maximizing (has a gross total, confidence).
fn select_base(candidates: &[ParseResult]) -> Option<&ParseResult> {
    let mut best: Option<&ParseResult> = None;
    for candidate in candidates {
        let has_ttc = candidate.total_ttc.is_some();
        let better = best.is_none_or(|b| {
            let best_has_ttc = b.total_ttc.is_some();
            (has_ttc && !best_has_ttc)
                || (has_ttc == best_has_ttc && candidate.confidence > b.confidence)
        });
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// Keep the first row for every (base, tax, gross) key, rounded to cents.
fn dedup_rows<'a>(rows: impl Iterator<Item = &'a TaxRow>) -> Vec<TaxRow> {
    let mut seen: HashSet<AmountKey> = HashSet::new();
    rows.filter(|row| {
        let fresh = seen.insert(row.amount_key());
        if !fresh {
            trace!("dropping duplicate row {:?}", row.signature());
        }
        fresh
    })
    .map(TaxRow::quantized)
    .collect()
}

/// Complete the one missing total when the other two are known.
fn derive_third(
    ht: Option<Decimal>,
    tva: Option<Decimal>,
    ttc: Option<Decimal>,
) -> (Option<Decimal>, Option<Decimal>, Option<Decimal>) {
    match (ht, tva, ttc) {
        (None, Some(tva), Some(ttc)) => (Some(q2(ttc - tva)), Some(tva), Some(ttc)),
        (Some(ht), Some(tva), None) => (Some(ht), Some(tva), Some(q2(ht + tva))),
        (Some(ht), None, Some(ttc)) => (Some(ht), Some(q2(ttc - ht)), Some(ttc)),
        known => known,
    }
}
