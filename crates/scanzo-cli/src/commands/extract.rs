//! Extract command - read one OCR text and print the receipt.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use scanzo_core::{ExtractionService, Receipt};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file, or `-` to read stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,

    /// Feed the text to the rules without normalizing it
    #[arg(long)]
    raw: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used when writing one file per receipt.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.raw {
        config.extraction.normalize_input = false;
    }

    let text = read_input(&args.input)?;
    if text.trim().is_empty() {
        anyhow::bail!("Input is empty: {}", args.input.display());
    }

    info!("Extracting receipt from {}", args.input.display());

    let service = ExtractionService::new(config.extraction);
    let receipt = service
        .extract(&text)
        .map_err(|e| anyhow::anyhow!("No financial data found in {}: {}", args.input.display(), e))?;

    let min_confidence = service.config().min_confidence;
    if receipt.confidence < min_confidence {
        eprintln!(
            "{} Confidence {:.2} is below the configured minimum {:.2}",
            style("⚠").yellow(),
            receipt.confidence, min_confidence
        );
    }

    if args.validate {
        let issues = receipt.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_receipt(&receipt, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            receipt.confidence * 100.0
        );
        println!(
            "{} Completeness: {:.1}%",
            style("ℹ").blue(),
            receipt.completeness * 100.0
        );
        println!(
            "{} Rules: {}",
            style("ℹ").blue(),
            receipt.notes.join(", ")
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(fs::read_to_string(input)?)
}

pub fn format_receipt(receipt: &Receipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(receipt)?),
        OutputFormat::Csv => format_csv(receipt),
        OutputFormat::Text => Ok(format_text(receipt)),
    }
}

/// Display an optional value, empty when absent.
pub fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn format_csv(receipt: &Receipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "vendor",
        "date",
        "payment_method",
        "total_ht",
        "total_tva",
        "total_ttc",
        "rates",
        "coherent",
        "confidence",
    ])?;

    let rates: Vec<String> = receipt.rates().iter().map(|r| r.to_string()).collect();
    wtr.write_record([
        receipt.vendor.clone().unwrap_or_default(),
        opt(receipt.date),
        opt(receipt.payment_method),
        opt(receipt.total_ht),
        opt(receipt.total_tva),
        opt(receipt.total_ttc),
        rates.join(";"),
        receipt.coherent.to_string(),
        format!("{:.2}", receipt.confidence),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &Receipt) -> String {
    let mut output = String::new();

    output.push_str(&format!("Vendor: {}\n", receipt.vendor.as_deref().unwrap_or("-")));
    output.push_str(&format!("Date: {}\n", opt(receipt.date)));
    if let Some(method) = receipt.payment_method {
        output.push_str(&format!("Payment: {}\n", method));
    }
    output.push('\n');

    output.push_str("Totals:\n");
    output.push_str(&format!("  HT:  {} EUR\n", opt(receipt.total_ht)));
    output.push_str(&format!("  TVA: {} EUR\n", opt(receipt.total_tva)));
    output.push_str(&format!("  TTC: {} EUR\n", opt(receipt.total_ttc)));

    if !receipt.tax_lines.is_empty() {
        output.push('\n');
        output.push_str("Tax lines:\n");
        for line in &receipt.tax_lines {
            output.push_str(&format!(
                "  {}%  HT {}  TVA {}  TTC {}\n",
                line.rate,
                opt(line.base_ht),
                opt(line.tva),
                opt(line.ttc)
            ));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "Coherent: {}\n",
        if receipt.coherent { "yes" } else { "no" }
    ));

    output
}
