//! Extract command - read the fields of a single invoice.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invaudit_core::{Aggregator, AuditPipeline, InvoiceRecord, Table, NOT_FOUND};

use super::{is_pdf, load_config, table_to_csv};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print fields that were not found and other extraction warnings
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (one invoice table row)
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !is_pdf(&args.input) {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    }

    info!("Extracting file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Reading PDF...");

    let source = args.input.display().to_string();
    let data = fs::read(&args.input)?;
    let pipeline = AuditPipeline::new(config.clone());
    let document = pipeline.load(&source, &data)?;

    pb.set_message("Extracting invoice fields...");
    let result = Aggregator::new().build_record(&document);
    pb.finish_and_clear();

    if args.show_warnings {
        for field in &result.missing_fields {
            eprintln!("{} {} not found", style("!").yellow(), field);
        }
        for warning in &result.warnings {
            eprintln!("{} {}", style("!").yellow(), warning);
        }
    }

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&result.record)?,
        OutputFormat::Csv => {
            table_to_csv(&Table::from_records([&result.record], config.extraction.item_columns)?)?
        }
        OutputFormat::Text => format_text(&result.record),
    };

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

    debug!(
        "Total processing time: {:?} (parse {}ms)",
        start.elapsed(),
        result.processing_time_ms
    );

    Ok(())
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", record.invoice_number));
    output.push_str(&format!("Source: {}\n", record.source));
    output.push('\n');

    output.push_str("Vendor:\n");
    output.push_str(&format!("  {}\n", record.company_name));
    for line in record.company_address.lines() {
        output.push_str(&format!("  {}\n", line.trim()));
    }
    if record.company_contact != NOT_FOUND {
        output.push_str(&format!("  Contact: {}\n", record.company_contact));
    }
    output.push('\n');

    output.push_str("Customer:\n");
    output.push_str(&format!("  {}\n", record.customer_name));
    output.push_str(&format!("  {}\n", record.customer_address));
    if record.customer_gstin != NOT_FOUND {
        output.push_str(&format!("  GSTIN: {}\n", record.customer_gstin));
    }
    output.push('\n');

    output.push_str("Items:\n");
    if record.items_qty_rate.is_empty() {
        output.push_str("  (none)\n");
    }
    for key in &record.items_qty_rate {
        output.push_str(&format!(
            "  {} x{} @ {}\n",
            key.name, key.quantity, key.rate
        ));
    }
    output.push('\n');

    output.push_str(&format!("Charges before tax: {}\n", record.charges_before_tax));
    output.push_str(&format!("Fonts: {} ({})\n", record.font_style, record.font_sizes));

    output
}
