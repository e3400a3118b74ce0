//! Fixed-point helpers shared by the amount rules.
//!
//! All monetary values are `rust_decimal::Decimal` quantized to two places with
//! round-half-up. Rates are kept as decimals too and only converted to `f64`
//! when a receipt is assembled.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::ExtractionError;

/// Tolerance used when checking `HT + TVA == TTC` inside a rule.
pub fn amount_tolerance() -> Decimal {
    Decimal::new(2, 2)
}

/// Residual above which a (base, tax, gross) triplet is rejected outright.
pub fn max_row_residual() -> Decimal {
    Decimal::ONE
}

/// Largest magnitude accepted as an amount. Anything bigger is OCR noise and
/// would overflow `Decimal` arithmetic downstream.
pub fn max_amount() -> Decimal {
    Decimal::new(1_000_000_000_000, 0)
}

/// Standard French VAT rates that nearby readings snap to.
pub fn canonical_rates() -> [Decimal; 3] {
    [Decimal::new(55, 1), Decimal::TEN, Decimal::new(20, 0)]
}

/// Round to cents, half away from zero.
pub fn q2(x: Decimal) -> Decimal {
    x.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `q2` lifted over an optional value.
pub fn q2_opt(x: Option<Decimal>) -> Option<Decimal> {
    x.map(q2)
}

/// Parse a French-formatted number ("1 234,56", "12.30", "-3,5") into a
/// two-decimal fixed-point value.
///
/// Spaces (including no-break and narrow no-break spaces) are thousands
/// separators. When both `,` and `.` appear, the last one is the decimal mark.
pub fn parse_amount(s: &str) -> Result<Decimal, ExtractionError> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '.' | ','))
        .collect();
    let cleaned = cleaned.trim_end_matches(['.', ',']);

    if matches!(cleaned, "" | "-" | "." | "-.") {
        return Err(ExtractionError::NotANumber(s.to_string()));
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        _ => cleaned.replace(',', "."),
    };

    let value = Decimal::from_str(&normalized)
        .map(q2)
        .map_err(|_| ExtractionError::NotANumber(s.to_string()))?;

    if value.abs() >= max_amount() {
        return Err(ExtractionError::NotANumber(s.to_string()));
    }
    Ok(value)
}

/// `|a - b| <= tol`.
pub fn almost_eq(a: Decimal, b: Decimal, tol: Decimal) -> bool {
    (a - b).abs() <= tol
}

/// Rate in percent implied by a base and a tax amount. Undefined when the base
/// is not strictly positive.
pub fn rate_from_amounts(base_ht: Option<Decimal>, tva: Option<Decimal>) -> Option<Decimal> {
    match (base_ht, tva) {
        (Some(base), Some(tax)) if base > Decimal::ZERO => {
            Some(q2(tax * Decimal::ONE_HUNDRED / base))
        }
        _ => None,
    }
}

/// Snap a raw rate onto a canonical rate when within 0.3 points, otherwise
/// round it to one decimal.
pub fn snap_rate(rate: Option<Decimal>) -> Option<Decimal> {
    let rate = rate?;
    let window = Decimal::new(3, 1);

    if let Some(canon) = canonical_rates()
        .into_iter()
        .find(|canon| almost_eq(rate, *canon, window))
    {
        return Some(canon);
    }

    Some(rate.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// Turn a printed or missing rate into a clean percentage.
///
/// - missing: derived from the amounts
/// - equal to the tax or base amount (within 0.05): it was a misread amount,
///   derived from the amounts instead
/// - in (0, 1.5]: a fraction, multiplied by 100
/// - `<= 0` or `>= 60`: derived from the amounts
///
/// The result is always passed through [`snap_rate`].
pub fn normalize_rate(
    rate: Option<Decimal>,
    base_ht: Option<Decimal>,
    tva: Option<Decimal>,
) -> Option<Decimal> {
    let derived = rate_from_amounts(base_ht, tva);

    let Some(mut rate) = rate else {
        return snap_rate(derived);
    };

    let coincidence = Decimal::new(5, 2);
    let matches_amount = |amount: Option<Decimal>| {
        amount.is_some_and(|amount| almost_eq(rate, amount, coincidence))
    };
    if matches_amount(tva) || matches_amount(base_ht) {
        return snap_rate(derived);
    }

    if rate > Decimal::ZERO && rate <= Decimal::new(15, 1) {
        rate *= Decimal::ONE_HUNDRED;
    }

    if rate <= Decimal::ZERO || rate >= Decimal::new(60, 0) {
        return snap_rate(derived);
    }

    snap_rate(Some(rate))
}

/// Complete or correct a partial (HT, TVA, TTC) reading: when two values are
/// present the third is recomputed, and replaced if it disagrees by more than
/// the 0.02 tolerance.
pub fn fix_ttc(
    ht: Option<Decimal>,
    tva: Option<Decimal>,
    ttc: Option<Decimal>,
) -> (Option<Decimal>, Option<Decimal>, Option<Decimal>) {
    let tol = amount_tolerance();
    let disagrees = |calc: Decimal, got: Option<Decimal>| got.is_none_or(|got| !almost_eq(calc, got, tol));

    match (ht, tva, ttc) {
        (Some(h), Some(t), _) => {
            let calc = q2(h + t);
            let ttc = if disagrees(calc, ttc) { Some(calc) } else { ttc };
            (ht, tva, ttc)
        }
        (Some(h), None, Some(g)) => {
            let calc = q2(g - h);
            (ht, Some(calc), ttc)
        }
        (None, Some(t), Some(g)) => {
            let calc = q2(g - t);
            (Some(calc), tva, ttc)
        }
        _ => (ht, tva, ttc),
    }
}
