//! French receipt amount extraction.
//!
//! A bank of independent rules each propose a candidate reading of the text;
//! the merger reconciles them and the scorer judges the result.

pub mod extractor;
pub mod fields;
pub mod merger;
pub mod numeric;
pub mod patterns;
pub mod rules;
pub mod scoring;
mod service;

pub use extractor::AmountsExtractor;
pub use merger::Merger;
pub use rules::{AmountRule, amount_rules};
pub use service::ExtractionService;
