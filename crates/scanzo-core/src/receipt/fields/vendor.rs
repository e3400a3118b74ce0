//! Merchant name heuristic over the receipt header.

use crate::receipt::patterns::VENDOR_NOISE;

use super::{ExtractionMatch, FieldExtractor};

/// Non-empty lines considered as the header.
const HEADER_LINES: usize = 12;

/// Vendor name extractor.
///
/// Header lines carrying administrative or address data are skipped, as are
/// lines that are mostly digits. A fully uppercase line is preferred, the way
/// most tickets print the shop name.
pub struct VendorExtractor;

impl VendorExtractor {
    pub fn new() -> Self {
        Self
    }

    fn is_candidate(line: &str) -> bool {
        if VENDOR_NOISE.is_match(line) {
            return false;
        }
        let letters = line.chars().filter(|c| c.is_alphabetic()).count();
        let digits = line.chars().filter(|c| c.is_numeric()).count();
        letters > digits && line.chars().count() >= 3
    }

    fn is_shouting(line: &str) -> bool {
        let len = line.chars().count();
        line.to_uppercase() == line && (2..=40).contains(&len)
    }
}

impl Default for VendorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for VendorExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let (upper, other): (Vec<&str>, Vec<&str>) = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(HEADER_LINES)
            .filter(|l| Self::is_candidate(l))
            .partition(|l| Self::is_shouting(l));

        let preferred = upper.into_iter().map(|l| (l, 0.8));
        let fallback = other.into_iter().map(|l| (l, 0.5));
        preferred
            .chain(fallback)
            .map(|(l, confidence)| ExtractionMatch::new(l.to_string(), confidence, l))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_name_preferred() {
        let text = "Bienvenue\nSUSHI CHARLES\n12 rue de la Paix\n75002 PARIS\nSIRET 123 456 789";
        let vendor = VendorExtractor::new().extract(text).unwrap();
        assert_eq!(vendor.value, "SUSHI CHARLES");
        assert_eq!(vendor.confidence, 0.8);
    }

    #[test]
    fn test_falls_back_to_first_candidate() {
        let text = "Chez Paul\nTel 01 23 45 67 89";
        let vendor = VendorExtractor::new().extract(text).unwrap();
        assert_eq!(vendor.value, "Chez Paul");
    }

    #[test]
    fn test_skips_administrative_lines() {
        let text = "TVA FR12345678901\nwww.example.fr\n2025\nAB";
        assert!(VendorExtractor::new().extract(text).is_none());
    }

    #[test]
    fn test_only_header_is_scanned() {
        let mut text = "1\n".repeat(12);
        text.push_str("LATE NAME");
        assert!(VendorExtractor::new().extract(&text).is_none());
    }
}
