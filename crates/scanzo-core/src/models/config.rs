//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Main configuration for scanzo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanzoConfig {
    /// Receipt extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Receipt extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run the text normalizer (no-break spaces, glued amounts) before the rules.
    pub normalize_input: bool,

    /// Let the merger compute the third total when exactly two are known.
    pub derive_missing_totals: bool,

    /// Tolerance for the coherence check, in currency units.
    pub coherence_tolerance: Decimal,

    /// Minimum merged confidence for a receipt to be accepted by callers.
    /// The engine itself never rejects a result.
    pub min_confidence: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            normalize_input: true,
            derive_missing_totals: true,
            coherence_tolerance: Decimal::new(10, 2),
            min_confidence: 0.0,
        }
    }
}

impl ScanzoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
