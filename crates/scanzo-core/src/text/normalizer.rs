//! Cleanup of raw OCR output.
//!
//! OCR engines glue consecutive amounts together (`30,003,00`), emit no-break
//! spaces inside numbers and stick the euro sign to its amount. The rules
//! expect one space-separated token per value and trimmed lines.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ",00" directly followed by another digit
    static ref GLUED_AMOUNT: Regex = Regex::new(r"([.,]\d{2})(\d)").unwrap();

    static ref EURO_SIGN: Regex = Regex::new(r"[^\S\n]*€[^\S\n]*").unwrap();

    static ref TRAILING_SPACE: Regex = Regex::new(r"\s+\n").unwrap();

    static ref BLANK_LINES: Regex = Regex::new(r"\n+").unwrap();
}

/// Normalize OCR text for the amount rules.
///
/// No-break and narrow no-break spaces become plain spaces, the euro sign is
/// padded with single spaces, glued amounts are split and every line is
/// trimmed. Applying it twice gives the same text.
pub fn normalize(raw: &str) -> String {
    let text = raw.replace(['\u{00a0}', '\u{202f}'], " ");
    let text = EURO_SIGN.replace_all(&text, " € ");
    let text = GLUED_AMOUNT.replace_all(&text, "$1 $2");

    text.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

/// Drop invisible artifacts and blank lines.
pub fn clean(raw: &str) -> String {
    let text = raw.replace(['\u{3002}', '\u{00a0}'], " ");
    let text = TRAILING_SPACE.replace_all(&text, "\n");
    let text = BLANK_LINES.replace_all(&text, "\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_glued_amounts() {
        assert_eq!(normalize("30,003,00"), "30,00 3,00");
        assert_eq!(normalize("TVA 10% 11,821,1813,00"), "TVA 10% 11,82 1,18 13,00");
        assert_eq!(normalize("12,0034"), "12,00 34");
    }

    #[test]
    fn test_spaces_and_euro_sign() {
        assert_eq!(normalize("1\u{00a0}234,56€"), "1 234,56 €");
        assert_eq!(normalize("  6,95 €  (69,55€ HT)  "), "6,95 € (69,55 € HT)");
        assert_eq!(normalize("1\u{202f}000,00"), "1 000,00");
    }

    #[test]
    fn test_lines_trimmed_and_kept() {
        assert_eq!(normalize("  A  \n\n  B"), "A\n\nB");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = "NAMASTE\u{00a0}INDIEN \n10% : 6,95€(69,55 €HT / 76,50€ TTC)\n30,003,00\n";
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean("  A \t\n\n\nB\u{3002}\n  "), "A\nB");
        assert_eq!(clean("X\u{00a0}Y"), "X Y");
    }
}
