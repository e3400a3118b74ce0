//! Top-level receipt extraction.

use std::fmt;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::{Receipt, TaxLine};
use crate::text::{clean, normalize};

use super::extractor::AmountsExtractor;
use super::fields::{
    DateExtractor, ExtractionMatch, FieldExtractor, PaymentExtractor, VendorExtractor,
};
use super::merger::Merger;
use super::scoring::{coherent_with_tolerance, confidence_proxy};

/// Turns raw OCR text into a [`Receipt`].
///
/// Each call owns its candidates and merged result, so one service can be
/// shared by any number of threads.
pub struct ExtractionService {
    config: ExtractionConfig,
    amounts: AmountsExtractor,
    vendor: VendorExtractor,
    dates: DateExtractor,
    payment: PaymentExtractor,
}

impl ExtractionService {
    pub fn new(config: ExtractionConfig) -> Self {
        let merger = Merger::new().with_derivation(config.derive_missing_totals);
        Self {
            config,
            amounts: AmountsExtractor::new().with_merger(merger),
            vendor: VendorExtractor::new(),
            dates: DateExtractor::new(),
            payment: PaymentExtractor::new(),
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract a receipt from raw OCR text.
    ///
    /// Fails with [`ExtractionError::NoCandidates`] when no rule recognized any
    /// amount. A partial or low-confidence reading is still a success.
    pub fn extract(&self, raw: &str) -> Result<Receipt, ExtractionError> {
        let start = Instant::now();

        // The rules see blank lines, which end vertical runs. Header fields are
        // read from the cleaned text, before glued amounts are split, which would
        // cut "14.06.2025" into "14.06.20 25".
        let (cleaned, text) = if self.config.normalize_input {
            (clean(raw), normalize(raw))
        } else {
            (raw.to_string(), raw.to_string())
        };

        let vendor = traced("vendor", self.vendor.extract(&cleaned));
        let date = traced("date", self.dates.extract(&cleaned));
        let payment_method = traced("payment", self.payment.extract(&text));

        let merged = self
            .amounts
            .merged(&text)
            .ok_or(ExtractionError::NoCandidates)?;

        let mut receipt = Receipt {
            vendor,
            date,
            payment_method,
            total_ht: merged.total_ht,
            total_tva: merged.total_tva,
            total_ttc: merged.total_ttc,
            tax_lines: merged.tax_rows.iter().map(TaxLine::from).collect(),
            coherent: false,
            confidence: merged.confidence.min(1.0),
            completeness: 0.0,
            notes: merged.notes.into_iter().collect(),
            raw_text: text,
        };
        receipt.coherent = coherent_with_tolerance(&receipt, self.config.coherence_tolerance);
        receipt.completeness = confidence_proxy(&receipt);

        info!(
            "extracted receipt in {:?}: ttc={:?} coherent={} confidence={:.2}",
            start.elapsed(),
            receipt.total_ttc,
            receipt.coherent,
            receipt.confidence
        );

        Ok(receipt)
    }
}

/// Log where a header field was found and keep its value.
fn traced<T: fmt::Debug>(field: &str, found: Option<ExtractionMatch<T>>) -> Option<T> {
    match &found {
        Some(m) => debug!(
            "{}={:?} from {:?} at {:?} (confidence {:.2})",
            field, m.value, m.source, m.position, m.confidence
        ),
        None => debug!("{}: not found", field),
    }
    found.map(|m| m.value)
}

impl Default for ExtractionService {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn test_no_candidates() {
        let service = ExtractionService::default();
        assert_eq!(
            service.extract("BONJOUR\nA BIENTOT").unwrap_err(),
            ExtractionError::NoCandidates
        );
    }

    #[test]
    fn test_dotted_date_survives_normalization() {
        let service = ExtractionService::default();
        let receipt = service.extract("STORIA\n14.06.2025\nTOTAL TTC 33,00").unwrap();
        assert_eq!(receipt.date, NaiveDate::from_ymd_opt(2025, 6, 14));
        assert_eq!(receipt.vendor.as_deref(), Some("STORIA"));
    }

    #[test]
    fn test_raw_mode_skips_normalization() {
        let raw = "TOTAL TTC 33,00€\n\n";

        let mut config = ExtractionConfig::default();
        config.normalize_input = false;
        let receipt = ExtractionService::new(config).extract(raw).unwrap();
        assert_eq!(receipt.raw_text, raw);

        let receipt = ExtractionService::default().extract(raw).unwrap();
        assert_eq!(receipt.raw_text, "TOTAL TTC 33,00 €\n");
        assert_eq!(receipt.total_ttc, Some(Decimal::new(3300, 2)));
    }

    #[test]
    fn test_blank_line_ends_vertical_run() {
        let text = "HT\n10,00\n\n1,00\n11,00";
        assert!(AmountsExtractor::new().merged(&normalize(text)).is_none());
        assert_eq!(
            ExtractionService::default().extract(text).unwrap_err(),
            ExtractionError::NoCandidates
        );
    }

    #[test]
    fn test_configured_tolerance() {
        let text = "TOTAL HT 30,00\nTOTAL TVA 3,00\nTOTAL TTC 33,50";
        let strict = ExtractionService::default().extract(text).unwrap();
        assert!(!strict.coherent);

        let mut config = ExtractionConfig::default();
        config.coherence_tolerance = Decimal::ONE;
        let loose = ExtractionService::new(config).extract(text).unwrap();
        assert!(loose.coherent);
    }
}
