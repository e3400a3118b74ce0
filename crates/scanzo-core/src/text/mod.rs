//! OCR text preparation ahead of the amount rules.

mod normalizer;

pub use normalizer::{clean, normalize};
