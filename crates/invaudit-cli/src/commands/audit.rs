//! Audit command - process a batch of invoices and export both tables.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use invaudit_core::{AuditPipeline, AuditReport, Batch, BatchPolicy};

use super::{is_pdf, load_config, table_to_csv};

/// Arguments for the audit command.
#[derive(Args)]
pub struct AuditArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Export format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: ExportFormat,

    /// Skip unreadable documents instead of aborting the batch
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated tables
    Csv,
    /// JSON arrays of records and issues
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

pub async fn run(args: AuditArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.continue_on_error {
        config.output.continue_on_error = true;
    }

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No PDF files found for: {}", args.inputs.join(" "));
    }

    println!(
        "{} Found {} files to audit",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let pipeline = AuditPipeline::new(config.clone());
    let mut batch = Batch::new();

    for path in &files {
        let source = path.display().to_string();
        pb.set_message(source.clone());

        if let Err(e) = pipeline.add_file(&mut batch, path) {
            pb.abandon();
            error!("Failed to read {}: {}", source, e.error);
            anyhow::bail!("Audit aborted, no export written: {}", e);
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let report = pipeline.finish(batch)?;

    // Render both artifacts before writing either.
    let (invoices, issues) = render(&report, args.format, config.extraction.item_columns)?;

    let output_dir = args.output_dir.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let extension = args.format.extension();
    let invoices_path = output_dir.join(format!("{}.{}", config.output.invoices_name, extension));
    let issues_path = output_dir.join(format!("{}.{}", config.output.issues_name, extension));

    write_pair(
        &output_dir,
        (invoices_path.as_path(), invoices.as_str()),
        (issues_path.as_path(), issues.as_str()),
    )?;
    debug!(
        "Wrote {} and {}",
        invoices_path.display(),
        issues_path.display()
    );

    print_summary(&report, pipeline.policy(), start);
    println!(
        "{} Invoice details written to {}",
        style("✓").green(),
        invoices_path.display()
    );
    println!(
        "{} Issues written to {}",
        style("✓").green(),
        issues_path.display()
    );

    Ok(())
}

/// Expand glob patterns into PDF paths, keeping first-seen order.
fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = BTreeSet::new();

    for pattern in patterns {
        for path in glob(pattern)?.filter_map(|r| r.ok()) {
            if !is_pdf(&path) || !path.is_file() {
                debug!("Ignoring non-PDF input {}", path.display());
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    info!("{} patterns expanded to {} files", patterns.len(), files.len());
    Ok(files)
}

/// Write both artifacts or neither.
///
/// Contents are staged in temporary files next to their targets and renamed
/// into place; if the second rename fails the first target is removed again.
fn write_pair(dir: &Path, first: (&Path, &str), second: (&Path, &str)) -> anyhow::Result<()> {
    let stage = |contents: &str| -> anyhow::Result<NamedTempFile> {
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(file)
    };

    let first_file = stage(first.1)?;
    let second_file = stage(second.1)?;

    first_file.persist(first.0)?;
    if let Err(e) = second_file.persist(second.0) {
        error!("Failed to write {}: {}", second.0.display(), e.error);
        if let Err(cleanup) = fs::remove_file(first.0) {
            warn!("Could not remove {}: {}", first.0.display(), cleanup);
        }
        return Err(e.into());
    }

    Ok(())
}

fn render(
    report: &AuditReport,
    format: ExportFormat,
    item_columns: usize,
) -> anyhow::Result<(String, String)> {
    match format {
        ExportFormat::Csv => Ok((
            table_to_csv(&report.invoice_table(item_columns)?)?,
            table_to_csv(&report.issue_table())?,
        )),
        ExportFormat::Json => Ok((
            serde_json::to_string_pretty(&report.records)?,
            serde_json::to_string_pretty(&report.issues)?,
        )),
    }
}

fn print_summary(report: &AuditReport, policy: BatchPolicy, start: Instant) {
    let issue_count = report
        .issues
        .iter()
        .map(|issue| issue.id)
        .collect::<BTreeSet<_>>()
        .len();

    println!();
    println!(
        "{} Audited {} documents in {:?} ({})",
        style("✓").green(),
        report.records.len(),
        start.elapsed(),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "   {} issues across {} rows",
        if issue_count == 0 {
            style(issue_count).green()
        } else {
            style(issue_count).yellow()
        },
        report.issues.len()
    );

    if policy == BatchPolicy::Skip && !report.failures.is_empty() {
        println!();
        println!("{}", style("Skipped files:").red());
        for failure in &report.failures {
            println!("  - {}: {}", failure.source, failure.reason);
        }
    }
}
