//! Tax rows and candidate readings produced by the amount rules.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::receipt::numeric::{almost_eq, fix_ttc, max_row_residual, normalize_rate, q2, q2_opt};

/// One VAT-rate line of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRow {
    /// Rate in percent, `None` until resolved.
    pub rate: Option<Decimal>,

    /// Pre-tax base (HT).
    pub base_ht: Option<Decimal>,

    /// Tax amount (TVA).
    pub tva: Option<Decimal>,

    /// Gross amount (TTC).
    pub ttc: Option<Decimal>,
}

/// Exact-value key for a row: rate and amounts rounded to 0.01.
pub type RowSignature = (
    Option<Decimal>,
    Option<Decimal>,
    Option<Decimal>,
    Option<Decimal>,
);

/// Amount-only key, used when merging rows proposed by several rules.
pub type AmountKey = (Option<Decimal>, Option<Decimal>, Option<Decimal>);

impl TaxRow {
    /// Build a row from a complete (base, tax, gross) triplet.
    ///
    /// Returns `None` when `base + tax` misses `gross` by more than 1.00.
    /// Otherwise the gross amount is reconciled to `base + tax`, all amounts
    /// are rounded to cents and the rate is normalized against the amounts.
    pub fn reconciled(
        rate: Option<Decimal>,
        base_ht: Decimal,
        tva: Decimal,
        ttc: Decimal,
    ) -> Option<Self> {
        if !almost_eq(base_ht + tva, ttc, max_row_residual()) {
            return None;
        }

        let (base_ht, tva, ttc) = fix_ttc(Some(base_ht), Some(tva), Some(ttc));
        let base_ht = q2_opt(base_ht);
        let tva = q2_opt(tva);

        Some(Self {
            rate: normalize_rate(rate, base_ht, tva),
            base_ht,
            tva,
            ttc: q2_opt(ttc),
        })
    }

    /// Signature used for strict deduplication.
    pub fn signature(&self) -> RowSignature {
        (
            self.rate.map(|r| r.round_dp(2)),
            q2_opt(self.base_ht),
            q2_opt(self.tva),
            q2_opt(self.ttc),
        )
    }

    /// (base, tax, gross) rounded to cents.
    pub fn amount_key(&self) -> AmountKey {
        (q2_opt(self.base_ht), q2_opt(self.tva), q2_opt(self.ttc))
    }

    /// Copy of this row with every amount rounded to cents.
    pub fn quantized(&self) -> Self {
        Self {
            rate: self.rate,
            base_ht: q2_opt(self.base_ht),
            tva: q2_opt(self.tva),
            ttc: q2_opt(self.ttc),
        }
    }

    /// Gross amount, or `base + tax` when the gross is absent.
    pub fn gross_or_sum(&self) -> Decimal {
        self.ttc.unwrap_or_else(|| {
            self.base_ht.unwrap_or_default() + self.tva.unwrap_or_default()
        })
    }
}

/// A single rule's proposed reading of the receipt. Any field may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Pre-tax total.
    pub total_ht: Option<Decimal>,

    /// Gross total.
    pub total_ttc: Option<Decimal>,

    /// Tax total.
    pub total_tva: Option<Decimal>,

    /// Per-rate breakdown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tax_rows: Vec<TaxRow>,

    /// Confidence in [0, 1].
    pub confidence: f32,

    /// Provenance tags, for diagnostics only.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub notes: BTreeSet<String>,
}

/// The merger's output has the same shape as a candidate.
pub type MergedResult = ParseResult;

impl ParseResult {
    /// Empty candidate tagged with the producing rule.
    pub fn new(confidence: f32, note: &str) -> Self {
        Self {
            total_ht: None,
            total_ttc: None,
            total_tva: None,
            tax_rows: Vec::new(),
            confidence,
            notes: BTreeSet::from([note.to_string()]),
        }
    }

    /// Set the three totals.
    pub fn with_totals(
        mut self,
        total_ht: Option<Decimal>,
        total_tva: Option<Decimal>,
        total_ttc: Option<Decimal>,
    ) -> Self {
        self.total_ht = total_ht;
        self.total_tva = total_tva;
        self.total_ttc = total_ttc;
        self
    }

    /// Attach tax rows.
    pub fn with_rows(mut self, rows: Vec<TaxRow>) -> Self {
        self.tax_rows = rows;
        self
    }

    /// Add a provenance tag.
    pub fn with_note(mut self, note: &str) -> Self {
        self.notes.insert(note.to_string());
        self
    }

    /// Candidate whose totals are the column sums of `rows`.
    pub fn summing_rows(confidence: f32, note: &str, rows: Vec<TaxRow>) -> Self {
        let sum = |f: fn(&TaxRow) -> Option<Decimal>| q2(rows.iter().filter_map(f).sum());
        let total_ht = sum(|r| r.base_ht);
        let total_tva = sum(|r| r.tva);
        let total_ttc = sum(|r| r.ttc);

        Self::new(confidence, note)
            .with_totals(Some(total_ht), Some(total_tva), Some(total_ttc))
            .with_rows(rows)
    }
}
