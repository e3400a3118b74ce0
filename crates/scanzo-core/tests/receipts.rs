//! End-to-end extraction over realistic receipt texts.

use std::str::FromStr;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use scanzo_core::receipt::numeric::q2;
use scanzo_core::{
    AmountsExtractor, ExtractionConfig, ExtractionError, ExtractionService, PaymentMethod,
};

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

const NAMASTE: &str = "\
NAMASTE INDIEN
12 RUE DU FAUBOURG
14/06/2025 20:41
10% : 6,95 € (69,55 € HT / 76,50 € TTC)
CB 76,50 €
MERCI DE VOTRE VISITE";

const PARADIS: &str = "\
PARADIS DU FRUIT
CODE  Taux    TVA    HT     TTC
A     10.00%  5,05   50,55  55,60
B     10.00%  2,21   22,09  24,30
TOTAL TTC 79,90
ESPECES 80,00";

#[test]
fn parenthetical_receipt() {
    let receipt = ExtractionService::default().extract(NAMASTE).unwrap();

    assert_eq!(receipt.vendor.as_deref(), Some("NAMASTE INDIEN"));
    assert_eq!(receipt.date, chrono::NaiveDate::from_ymd_opt(2025, 6, 14));
    assert_eq!(receipt.payment_method, Some(PaymentMethod::Card));
    assert_eq!(receipt.total_ht, Some(d("69.55")));
    assert_eq!(receipt.total_tva, Some(d("6.95")));
    assert_eq!(receipt.total_ttc, Some(d("76.50")));
    assert_eq!(receipt.confidence, 0.95);
    assert!(receipt.coherent);

    assert_eq!(receipt.tax_lines.len(), 1);
    let first = &receipt.tax_lines[0];
    assert_eq!(first.rate, 10.0);
    assert_eq!(first.base_ht, Some(d("69.55")));
    assert_eq!(first.tva, Some(d("6.95")));
    assert_eq!(first.ttc, Some(d("76.50")));
    assert!(receipt.notes.contains(&"parenthetical".to_string()));
}

#[test]
fn column_table_receipt() {
    let receipt = ExtractionService::default().extract(PARADIS).unwrap();

    assert_eq!(receipt.total_ht, Some(d("72.64")));
    assert_eq!(receipt.total_tva, Some(d("7.26")));
    assert_eq!(receipt.total_ttc, Some(d("79.90")));
    assert!(receipt.coherent);
    assert_eq!(receipt.payment_method, Some(PaymentMethod::Cash));

    assert_eq!(receipt.tax_lines.len(), 2);
    assert_eq!(receipt.tax_lines[0].ttc, Some(d("55.60")));
    assert_eq!(receipt.tax_lines[1].ttc, Some(d("24.30")));
    assert!(receipt.notes.contains(&"inline_columns".to_string()));
}

#[test]
fn missing_gross_total_is_derived() {
    let text = "TOTAL HT 30,00\nTOTAL TVA 3,00";

    let receipt = ExtractionService::default().extract(text).unwrap();
    assert_eq!(receipt.total_ttc, Some(d("33.00")));
    assert!(receipt.coherent);

    let config = ExtractionConfig {
        derive_missing_totals: false,
        ..ExtractionConfig::default()
    };
    let receipt = ExtractionService::new(config).extract(text).unwrap();
    assert_eq!(receipt.total_ttc, None);
    assert!(!receipt.coherent);
}

#[test]
fn same_row_from_two_rules_is_kept_once() {
    let text = "TVA 10% : 6,95 € (69,55 € HT / 76,50 € TTC)";
    let receipt = ExtractionService::default().extract(text).unwrap();

    assert_eq!(receipt.tax_lines.len(), 1);
    assert!(receipt.notes.contains(&"parenthetical".to_string()));
    assert!(receipt.notes.contains(&"inline_any".to_string()));
}

#[test]
fn misread_rate_snaps_to_legal_rate() {
    let text = "Code Taux TVA HT TTC\nB 9.99% 2,44 24,36 26,80";
    let receipt = ExtractionService::default().extract(text).unwrap();
    assert_eq!(receipt.tax_lines[0].rate, 10.0);
}

#[test]
fn extraction_is_deterministic() {
    let service = ExtractionService::default();
    let first = serde_json::to_string(&service.extract(PARADIS).unwrap()).unwrap();
    let second = serde_json::to_string(&service.extract(PARADIS).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn text_without_amounts_fails() {
    let err = ExtractionService::default()
        .extract("BOULANGERIE\nMERCI ET A BIENTOT")
        .unwrap_err();
    assert_eq!(err, ExtractionError::NoCandidates);
}

#[test]
fn receipt_serializes_amounts_as_strings() {
    let receipt = ExtractionService::default().extract(NAMASTE).unwrap();
    let json = serde_json::to_value(&receipt).unwrap();
    assert_eq!(json["total_ttc"], "76.50");
    assert_eq!(json["payment_method"], "card");
    assert!(json.get("raw_text").is_none());
}

fn french(x: Decimal) -> String {
    x.to_string().replace('.', ",")
}

#[test]
fn parenthetical_line_reproduces_any_triplet() {
    let edges = [
        "0.01", "0.05", "0.09", "0.10", "0.99", "1.00", "1.01", "9.99", "69.55", "999.99",
        "1000.00", "98765.43",
    ];
    let stepped = (1..4000).step_by(37).map(|cents| Decimal::new(cents, 2));
    let bases: Vec<Decimal> = edges.iter().map(|s| d(s)).chain(stepped).collect();
    let extractor = AmountsExtractor::new();

    for rate in ["5.5", "10", "20"].map(d) {
        for &ht in &bases {
            let tva = q2(ht * rate / Decimal::ONE_HUNDRED);
            let ttc = ht + tva;
            let line = format!(
                "{}% : {} € ({} € HT / {} € TTC)",
                french(rate),
                french(tva),
                french(ht),
                french(ttc)
            );

            let merged = extractor
                .merged(&line)
                .unwrap_or_else(|| panic!("no reading of {line}"));
            assert_eq!(merged.tax_rows.len(), 1, "{line}");
            let row = &merged.tax_rows[0];
            assert_eq!(row.base_ht, Some(ht), "{line}");
            assert_eq!(row.tva, Some(tva), "{line}");
            assert_eq!(row.ttc, Some(ttc), "{line}");
            assert_eq!(merged.total_ht, Some(ht), "{line}");
            assert_eq!(merged.total_tva, Some(tva), "{line}");
            assert_eq!(merged.total_ttc, Some(ttc), "{line}");
        }
    }
}

#[test]
fn oversized_amounts_are_ignored() {
    let huge = "70000000000000000000000000000";
    let service = ExtractionService::default();

    let err = service
        .extract(&format!("TOTAL HT {huge}\nTOTAL TVA {huge}"))
        .unwrap_err();
    assert_eq!(err, ExtractionError::NoCandidates);

    let err = service
        .extract(&format!("10% : {huge} ({huge} HT / 1 TTC)"))
        .unwrap_err();
    assert_eq!(err, ExtractionError::NoCandidates);
}
