//! Auxiliary receipt fields: vendor name, date and payment method.
//!
//! These extractors only decorate the final receipt. They never take part in
//! amount reconciliation.

pub mod dates;
pub mod payment;
pub mod vendor;

pub use dates::DateExtractor;
pub use payment::PaymentExtractor;
pub use vendor::VendorExtractor;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the preferred occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, preferred first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extracted value with its confidence and origin.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
