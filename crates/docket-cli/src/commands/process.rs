//! Process command - extract a record from a single court document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docket_core::court::SUMMARY_HEADERS;
use docket_core::{BatchRecord, CourtExtractor, DocumentExtractionResult, SummaryRow};

use super::{file_name, load_catalog, load_config, open_source};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.pdf, .txt or .json layout)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pattern catalog file
    #[arg(short, long)]
    patterns: Option<PathBuf>,

    /// County name; selects `{county}_patterns.json` and labels the record
    #[arg(long)]
    county: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON record
    Json,
    /// One-row summary CSV
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading pattern catalog...");
    let catalog = load_catalog(args.patterns.as_deref(), args.county.as_deref(), &config);
    let mut extractor = CourtExtractor::new(&catalog, &config.extraction);
    if let Some(county) = &args.county {
        extractor = extractor.with_county(county.as_str());
    }
    for error in extractor.pattern_errors() {
        eprintln!("{} {}", style("⚠").yellow(), error);
    }

    pb.set_message("Reading document...");
    let source = open_source(&args.input)?;

    pb.set_message("Extracting fields...");
    let result = extractor.extract(&file_name(&args.input), source.as_ref());
    pb.finish_and_clear();
    let result = result?;

    let output = format_result(&result, extractor.multi_date_field(), args.format)?;

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

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

fn format_result(
    result: &DocumentExtractionResult,
    multi_date_field: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result, multi_date_field),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(
    result: &DocumentExtractionResult,
    multi_date_field: Option<&str>,
) -> anyhow::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);

    let record = BatchRecord::Extracted(Box::new(result.clone()));
    wtr.write_record(SUMMARY_HEADERS)?;
    wtr.serialize(SummaryRow::from_record(&record, multi_date_field))?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(result: &DocumentExtractionResult) -> String {
    let mut output = String::new();
    let or_none = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    output.push_str(&format!("Document: {}\n", result.pdf_file));
    output.push_str(&format!("County:   {}\n", result.county));
    output.push('\n');

    output.push_str(&format!("Incident date: {}", or_none(&result.incident_date)));
    if let Some(source) = &result.incident_source_field {
        output.push_str(&format!(" (from {})", source));
    }
    output.push('\n');
    if let Some(end) = &result.incident_end_date {
        output.push_str(&format!("Incident end:  {}\n", end));
    }

    if !result.all_incident_dates.is_empty() {
        output.push_str("\nDates seen:\n");
        for candidate in &result.all_incident_dates {
            output.push_str(&format!(
                "  {} [{}] {}{}\n",
                candidate.original_date,
                candidate.standard_date.as_deref().unwrap_or("?"),
                candidate.source_field,
                if candidate.is_incident { ", incident" } else { "" }
            ));
        }
    }

    output.push_str(&format!("\nEmails: {}\n", or_none(&result.emails)));
    if let Some(contact) = &result.plaintiff_contact {
        output.push_str("\nPlaintiff contact:\n");
        for line in contact.lines() {
            output.push_str(&format!("  {}\n", line));
        }
    }

    if !result.extracted_data.is_empty() {
        output.push_str("\nFields:\n");
        for (name, value) in &result.extracted_data {
            output.push_str(&format!("  {}: {}\n", name, value));
        }
    }

    output
}
