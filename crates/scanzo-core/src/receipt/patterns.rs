//! Common regex patterns for French receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// A French-formatted amount: digits, optional space-separated thousands
/// groups, optional decimal part.
macro_rules! amount {
    () => {
        r"-?\d+(?:[ \u{00a0}\u{202f}]\d{3})*(?:[.,]\d+)?"
    };
}

/// Optional currency marker after an amount.
macro_rules! currency {
    () => {
        r"(?:€|eur|euros?)?"
    };
}

/// Horizontal whitespace.
macro_rules! hs {
    () => {
        r"[^\S\n]*"
    };
}

lazy_static! {
    // "10% : 6,95 € (69,55 € HT / 76,50 € TTC)"
    pub static ref PARENTHETICAL: Regex = Regex::new(concat!(
        r"(?i)\b(\d{1,2}(?:[.,]\d{1,2})?)%", hs!(), r"[:\-]?", hs!(),
        "(", amount!(), ")", hs!(), currency!(), hs!(),
        r"\(", hs!(), "(", amount!(), ")", hs!(), currency!(), hs!(), "HT",
        hs!(), "/", hs!(), "(", amount!(), ")", hs!(), currency!(), hs!(), "TTC",
        hs!(), r"\)"
    )).unwrap();

    // "CODE  Taux  TVA  HT  TTC"
    pub static ref COLUMNS_HEADER: Regex = Regex::new(
        r"(?i)\b(taux).*(tva).*(ht).*(ttc)\b"
    ).unwrap();

    // "B  10.00%  2,44  24,36  26,80"
    pub static ref COLUMNS_ROW: Regex = Regex::new(concat!(
        r"(?i)^[A-Z0-9\-]+\s+(\d{1,2}(?:[.,]\d{1,2})?)\s*%?\s+",
        "(", amount!(), r")\s+(", amount!(), r")\s+(", amount!(), ")"
    )).unwrap();

    // A line holding nothing but an amount.
    pub static ref NUMBER_LINE: Regex = Regex::new(concat!(
        r"(?i)^\s*(", amount!(), r")\s*", currency!(), r"\s*$"
    )).unwrap();

    // "TVA 10.00", "TVA: 5,5%"
    pub static ref RATE_HINT: Regex = Regex::new(
        r"(?i)\btva\b[^%\n\r]*?(\d{1,2}(?:[.,]\d{1,2})?)\s*%?"
    ).unwrap();

    // Labels opening a vertical block.
    pub static ref VERTICAL_ANCHOR: Regex = Regex::new(
        r"(?i)\b(ht|tva|ttc|base\s*ht|base\s*ttc|mt\.?\s*tva|montant\s*tva)\b"
    ).unwrap();

    pub static ref PERCENT_RATE: Regex = Regex::new(
        r"(?i)\b(\d{1,2}(?:[.,]\d{1,2})?)\s*%"
    ).unwrap();

    pub static ref HAS_TVA: Regex = Regex::new(
        r"(?i)\btva\b"
    ).unwrap();

    pub static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)\b(total(?:\s*t\.?t\.?c\.?)?|cb|montant\s+total)\b"
    ).unwrap();

    // Total lines
    pub static ref TOTAL_TTC: Regex = Regex::new(concat!(
        r"(?i)\btotal\s*t\.?\s*t\.?\s*c\.?\b.*?(", amount!(), ")"
    )).unwrap();

    pub static ref TOTAL_HT: Regex = Regex::new(concat!(
        r"(?i)\btotal\s*ht\b.*?(", amount!(), ")"
    )).unwrap();

    pub static ref TOTAL_TVA: Regex = Regex::new(concat!(
        r"(?i)\btotal\s*tva\b.*?(", amount!(), ")"
    )).unwrap();

    // "TTC 26,80", with or without a TOTAL prefix
    pub static ref TTC_ALONE: Regex = Regex::new(concat!(
        r"(?i)\b(?:total\s*)?t\.?\s*t\.?\s*c\.?\b.*?(", amount!(), ")"
    )).unwrap();

    // "CB: 26,80", "CARTE BLEUE 26,80"
    pub static ref PAYMENT_AMOUNT: Regex = Regex::new(concat!(
        r"(?i)\b(cb|carte\s*bleue|esp(?:èces)?|cash|amex|visa|mastercard)\b",
        hs!(), r"[:\-]?", hs!(), "(", amount!(), ")"
    )).unwrap();

    pub static ref PAYMENT_KEYWORD: Regex = Regex::new(
        r"(?i)\b(cb|carte\s*bleue|carte\s*bancaire|esp[eè]ces|cash|ch[eè]que|amex|visa|mastercard|apple\s*pay|google\s*pay)\b"
    ).unwrap();

    // Dates: 14-06-2025, 03/07/25, 14.06.2025
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})\b"
    ).unwrap();

    // "14 juin 2025", "3 janv. 2025"
    pub static ref DATE_FRENCH_LONG: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(janvier|janv|février|févr|fevrier|fev|mars|avril|avr|mai|juin|juillet|juil|août|aout|septembre|sept|octobre|oct|novembre|nov|décembre|déc|dec)\.?\s+(\d{4})\b"
    ).unwrap();

    // Administrative or address lines that never carry the vendor name.
    pub static ref VENDOR_NOISE: Regex = Regex::new(
        r"(?i)(siret|naf|tva|rcs|france|www\.|http|\btel\b|tél|telephone|instagram|facebook|@|centre\s+commercial|cours|avenue|\brue\b|boulevard|place|\b\d{5}\b)"
    ).unwrap();
}
