//! Payment method detection.

use crate::models::receipt::PaymentMethod;
use crate::receipt::patterns::PAYMENT_KEYWORD;

use super::{ExtractionMatch, FieldExtractor};

/// Payment method extractor.
pub struct PaymentExtractor;

impl PaymentExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PaymentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PaymentExtractor {
    type Output = ExtractionMatch<PaymentMethod>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        PAYMENT_KEYWORD
            .find_iter(text)
            .filter_map(|m| {
                let method = PaymentMethod::from_keyword(m.as_str())?;
                Some(ExtractionMatch::new(method, 0.9, m.as_str()).with_position(m.start(), m.end()))
            })
            .collect()
    }
}
