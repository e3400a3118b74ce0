//! Core library for French receipt OCR post-processing.
//!
//! This crate provides:
//! - Text normalization of raw OCR output
//! - Rule-based extraction of HT / TVA / TTC totals and per-rate tax rows
//! - Candidate merging with algebraic completion and coherence scoring
//! - Vendor, date and payment method heuristics

pub mod error;
pub mod models;
pub mod receipt;
pub mod text;

pub use error::{ExtractionError, Result, ScanzoError};
pub use models::config::{ExtractionConfig, ScanzoConfig};
pub use models::receipt::{PaymentMethod, Receipt, TaxLine};
pub use models::tax::{MergedResult, ParseResult, TaxRow};
pub use receipt::{AmountRule, AmountsExtractor, ExtractionService, Merger};
