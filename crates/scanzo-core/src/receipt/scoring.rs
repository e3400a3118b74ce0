//! Coherence check and completeness score of an assembled receipt.
//!
//! Both are advisory: they are reported next to the merged confidence and
//! never change the extracted amounts.

use rust_decimal::Decimal;

use crate::models::receipt::Receipt;

/// Default tolerance of the coherence check.
pub fn coherence_tolerance() -> Decimal {
    Decimal::new(10, 2)
}

/// Whether the receipt totals agree with each other within 0.10.
pub fn coherent(receipt: &Receipt) -> bool {
    coherent_with_tolerance(receipt, coherence_tolerance())
}

/// Totals are coherent when `HT + TVA` matches `TTC`, or failing that when the
/// tax lines add up to `TTC`.
pub fn coherent_with_tolerance(receipt: &Receipt, tolerance: Decimal) -> bool {
    let Some(ttc) = receipt.total_ttc else {
        return false;
    };

    if let (Some(ht), Some(tva)) = (receipt.total_ht, receipt.total_tva) {
        if (ht + tva - ttc).abs() <= tolerance {
            return true;
        }
    }

    if receipt.tax_lines.is_empty() {
        return false;
    }
    let lines_total: Decimal = receipt.tax_lines.iter().map(|l| l.gross_or_sum()).sum();
    (lines_total - ttc).abs() <= tolerance
}

/// Weighted field completeness in [0, 1].
pub fn confidence_proxy(receipt: &Receipt) -> f32 {
    let weighted = [
        (receipt.vendor.is_some(), 0.15_f32),
        (receipt.date.is_some(), 0.15),
        (receipt.total_ttc.is_some(), 0.25),
        (receipt.total_ht.is_some(), 0.15),
        (receipt.total_tva.is_some(), 0.15),
        (!receipt.tax_lines.is_empty(), 0.15),
        (coherent(receipt), 0.10),
    ];

    let score: f32 = weighted
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, weight)| *weight)
        .sum();
    score.min(1.0)
}
