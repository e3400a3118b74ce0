//! Receipt data model returned by the extraction service.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::tax::TaxRow;

/// A fully assembled receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Merchant name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    /// Transaction date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Payment method, when a keyword was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,

    /// Pre-tax total (HT).
    pub total_ht: Option<Decimal>,

    /// Tax total (TVA).
    pub total_tva: Option<Decimal>,

    /// Gross total (TTC).
    pub total_ttc: Option<Decimal>,

    /// Breakdown by VAT rate.
    #[serde(default)]
    pub tax_lines: Vec<TaxLine>,

    /// Whether the totals agree with each other within tolerance.
    pub coherent: bool,

    /// Merged rule confidence (0.0 - 1.0).
    pub confidence: f32,

    /// Weighted field-completeness score (0.0 - 1.0).
    pub completeness: f32,

    /// Provenance tags of the rules that contributed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    /// Normalized text the receipt was read from.
    #[serde(skip)]
    pub raw_text: String,
}

/// One VAT line in external form: the rate is a plain float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    /// Rate in percent (0.0 when it could not be resolved).
    pub rate: f64,

    /// Pre-tax base.
    pub base_ht: Option<Decimal>,

    /// Tax amount.
    pub tva: Option<Decimal>,

    /// Gross amount.
    pub ttc: Option<Decimal>,
}

impl TaxLine {
    /// Gross amount, or `base + tax` when the gross is absent.
    pub fn gross_or_sum(&self) -> Decimal {
        self.ttc.unwrap_or_else(|| {
            self.base_ht.unwrap_or_default() + self.tva.unwrap_or_default()
        })
    }
}

impl From<&TaxRow> for TaxLine {
    fn from(row: &TaxRow) -> Self {
        Self {
            rate: row.rate.and_then(|r| r.to_f64()).unwrap_or(0.0),
            base_ht: row.base_ht,
            tva: row.tva,
            ttc: row.ttc,
        }
    }
}

/// Payment method printed on the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank card (CB, carte bleue, Visa, ...).
    Card,
    /// Cash (espèces).
    Cash,
    /// Cheque.
    Check,
    /// Phone wallet (Apple Pay, Google Pay).
    Mobile,
}

impl PaymentMethod {
    /// Map a payment keyword to a method.
    pub fn from_keyword(s: &str) -> Option<Self> {
        let s: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        if s.contains("applepay") || s.contains("googlepay") || s.contains("mobile") {
            Some(PaymentMethod::Mobile)
        } else if s == "cb"
            || s.contains("carte")
            || s.contains("card")
            || s.contains("visa")
            || s.contains("amex")
            || s.contains("mastercard")
        {
            Some(PaymentMethod::Card)
        } else if s.contains("espèce") || s.contains("espece") || s.contains("cash") {
            Some(PaymentMethod::Cash)
        } else if s.contains("chèque") || s.contains("cheque") || s.contains("check") {
            Some(PaymentMethod::Check)
        } else {
            None
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Check => "check",
            PaymentMethod::Mobile => "mobile",
        };
        f.write_str(label)
    }
}

impl Receipt {
    /// List consistency issues in the extracted data.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.vendor.is_none() {
            issues.push("Missing vendor name".to_string());
        }

        let Some(ttc) = self.total_ttc else {
            issues.push("Missing total TTC".to_string());
            return issues;
        };

        if let (Some(ht), Some(tva)) = (self.total_ht, self.total_tva) {
            if (ht + tva - ttc).abs() > Decimal::new(10, 2) {
                issues.push(format!("Amount mismatch: {} + {} != {}", ht, tva, ttc));
            }
        }

        if !self.tax_lines.is_empty() {
            let line_tolerance = Decimal::new(50, 2);
            let sum_base: Decimal = self.tax_lines.iter().filter_map(|l| l.base_ht).sum();
            let sum_tax: Decimal = self.tax_lines.iter().filter_map(|l| l.tva).sum();

            if let Some(ht) = self.total_ht {
                if (sum_base - ht).abs() > line_tolerance {
                    issues.push(format!(
                        "Tax lines base sum ({}) differs from total HT ({})",
                        sum_base, ht
                    ));
                }
            }

            if let Some(tva) = self.total_tva {
                if (sum_tax - tva).abs() > line_tolerance {
                    issues.push(format!(
                        "Tax lines tax sum ({}) differs from total TVA ({})",
                        sum_tax, tva
                    ));
                }
            }
        }

        issues
    }

    /// Distinct VAT rates present in the breakdown, in order of appearance.
    pub fn rates(&self) -> Vec<f64> {
        let mut rates: Vec<f64> = Vec::new();
        for line in &self.tax_lines {
            if !rates.contains(&line.rate) {
                rates.push(line.rate);
            }
        }
        rates
    }
}
