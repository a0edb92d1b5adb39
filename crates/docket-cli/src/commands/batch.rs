//! Batch command - extract records from a folder or glob of documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use docket_core::court::SUMMARY_HEADERS;
use docket_core::{BatchFailure, BatchRecord, CourtExtractor, DocumentExtractionResult, SummaryRow};

use super::{SUPPORTED_EXTENSIONS, file_name, load_catalog, load_config, open_source};

/// Doc-id mapping file looked up in the input folder.
pub const MAPPING_FILE: &str = "pdf_to_docid_mapping.json";

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input folder or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory (default: from configuration)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Skip the per-document JSON files
    #[arg(long)]
    no_individual: bool,

    /// Doc-id mapping file (default: pdf_to_docid_mapping.json in the input folder)
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// Pattern catalog file
    #[arg(short, long)]
    patterns: Option<PathBuf>,

    /// County name; selects `{county}_patterns.json` and prefixes output files
    #[arg(long)]
    county: Option<String>,
}

/// External identifiers for one input file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MappingEntry {
    pub doc_id: String,
    #[serde(default)]
    pub original_path: Option<String>,
}

/// File name to external identifier mapping.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct DocIdMapping(BTreeMap<String, MappingEntry>);

impl DocIdMapping {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Exact file name first, then the first key the name ends with.
    pub fn lookup(&self, file: &str) -> Option<&MappingEntry> {
        self.0.get(file).or_else(|| {
            self.0
                .iter()
                .find(|(key, _)| file.ends_with(key.as_str()))
                .map(|(_, entry)| entry)
        })
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let input_dir = Path::new(&args.input);
    let files = if input_dir.is_dir() {
        list_folder(input_dir)?
    } else {
        expand_glob(&args.input)?
    };
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let mapping_path = args
        .mapping
        .clone()
        .or_else(|| input_dir.is_dir().then(|| input_dir.join(MAPPING_FILE)))
        .filter(|p| p.exists());
    let mapping = match mapping_path {
        Some(path) => match DocIdMapping::load(&path) {
            Ok(mapping) => {
                info!("Loaded doc-id mapping with {} entries", mapping.len());
                mapping
            }
            Err(e) => {
                warn!("Could not load mapping file {}: {}", path.display(), e);
                DocIdMapping::default()
            }
        },
        None => DocIdMapping::default(),
    };

    let catalog = load_catalog(args.patterns.as_deref(), args.county.as_deref(), &config);
    let mut extractor = CourtExtractor::new(&catalog, &config.extraction);
    if let Some(county) = &args.county {
        extractor = extractor.with_county(county.as_str());
    }
    for error in extractor.pattern_errors() {
        eprintln!("{} {}", style("⚠").yellow(), error);
    }
    let extractor = Arc::new(extractor);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let records = extract_all(files, extractor.clone(), args.jobs, &pb).await?;
    pb.finish_and_clear();

    let records: Vec<BatchRecord> = records
        .into_iter()
        .map(|record| attach_mapping(record, &mapping))
        .collect();

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.output_dir.clone());
    let prefix = args.county.as_deref().unwrap_or("batch");
    let save_individual = config.output.save_individual && !args.no_individual;

    let (json_path, csv_path) = write_outputs(
        &records,
        &output_dir,
        prefix,
        extractor.multi_date_field(),
        save_individual,
    )?;

    let failed: Vec<&BatchFailure> = records
        .iter()
        .filter_map(|r| match r {
            BatchRecord::Failed(failure) => Some(failure),
            BatchRecord::Extracted(_) => None,
        })
        .collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        records.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(records.len() - failed.len()).green(),
        style(failed.len()).red()
    );
    println!("   Results: {}", json_path.display());
    println!("   Summary: {}", csv_path.display());

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in &failed {
            println!("  - {}: {}", failure.pdf_file, failure.error);
        }
    }

    Ok(())
}

/// Supported documents directly inside a folder, sorted by name.
fn list_folder(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_supported(p))
        .collect();
    files.sort();
    Ok(files)
}

fn expand_glob(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    Ok(glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect())
}

fn is_supported(path: &Path) -> bool {
    if path.file_name().and_then(|n| n.to_str()) == Some(MAPPING_FILE) {
        return false;
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// Run the extractor over every file with at most `jobs` documents in
/// flight. Records come back in input order.
async fn extract_all(
    files: Vec<PathBuf>,
    extractor: Arc<CourtExtractor>,
    jobs: usize,
    pb: &ProgressBar,
) -> anyhow::Result<Vec<BatchRecord>> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let permit = semaphore.clone().acquire_owned().await?;
        let worker = extractor.clone();
        let name = file_name(&path);
        let handle = tokio::task::spawn_blocking(move || {
            let record = extract_one(&path, &worker);
            drop(permit);
            record
        });
        handles.push((name, handle));
    }

    let mut records = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        records.push(joined(name, extractor.county(), handle.await));
        pb.inc(1);
    }
    Ok(records)
}

/// A worker that died turns into a failure row for its file.
fn joined(name: String, county: &str, outcome: Result<BatchRecord, JoinError>) -> BatchRecord {
    match outcome {
        Ok(record) => record,
        Err(e) => {
            error!("Worker for {} failed: {}", name, e);
            BatchRecord::Failed(BatchFailure {
                pdf_file: name,
                county: county.to_string(),
                error: format!("extraction aborted: {}", e),
                doc_id: None,
            })
        }
    }
}

fn extract_one(path: &Path, extractor: &CourtExtractor) -> BatchRecord {
    let name = file_name(path);
    debug!("Processing {}", name);

    let result = open_source(path)
        .and_then(|source| Ok(extractor.extract(&name, source.as_ref())?));

    match result {
        Ok(result) => BatchRecord::Extracted(Box::new(result)),
        Err(e) => {
            warn!("Failed to process {}: {}", name, e);
            BatchRecord::Failed(BatchFailure {
                pdf_file: name,
                county: extractor.county().to_string(),
                error: e.to_string(),
                doc_id: None,
            })
        }
    }
}

fn attach_mapping(record: BatchRecord, mapping: &DocIdMapping) -> BatchRecord {
    let Some(entry) = mapping.lookup(record.pdf_file()) else {
        return record;
    };
    debug!("Mapped {} to doc id {}", record.pdf_file(), entry.doc_id);

    match record {
        BatchRecord::Extracted(mut result) => {
            result.doc_id = Some(entry.doc_id.clone());
            result.original_path = entry.original_path.clone();
            BatchRecord::Extracted(result)
        }
        BatchRecord::Failed(mut failure) => {
            failure.doc_id = Some(entry.doc_id.clone());
            BatchRecord::Failed(failure)
        }
    }
}

/// Write the batch JSON, the summary CSV and, when asked, one JSON per
/// extracted document. Returns the batch JSON and CSV paths.
fn write_outputs(
    records: &[BatchRecord],
    output_dir: &Path,
    prefix: &str,
    multi_date_field: Option<&str>,
    save_individual: bool,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    let json_path = output_dir.join(format!("{}_batch_{}.json", prefix, timestamp));
    fs::write(&json_path, serde_json::to_string_pretty(records)?)?;

    let csv_path = output_dir.join(format!("{}_summary_{}.csv", prefix, timestamp));
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&csv_path)?;
    wtr.write_record(SUMMARY_HEADERS)?;
    for record in records {
        wtr.serialize(SummaryRow::from_record(record, multi_date_field))?;
    }
    wtr.flush()?;

    if save_individual {
        for record in records {
            if let BatchRecord::Extracted(result) = record {
                write_individual(result, output_dir)?;
            }
        }
    }

    Ok((json_path, csv_path))
}

fn write_individual(result: &DocumentExtractionResult, output_dir: &Path) -> anyhow::Result<()> {
    let dir = output_dir.join(&result.county);
    fs::create_dir_all(&dir)?;

    let stem = Path::new(&result.pdf_file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let path = dir.join(format!("{}.json", stem));
    fs::write(&path, serde_json::to_string_pretty(result)?)?;
    debug!("Wrote output to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::{ExtractionConfig, PatternCatalog};

    fn mapping() -> DocIdMapping {
        serde_json::from_str(
            r#"{
                "roe.pdf": {"doc_id": "A1", "original_path": "gs://bucket/roe.pdf"},
                "smith.pdf": {"doc_id": "B2"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_mapping_exact_then_suffix() {
        let mapping = mapping();
        assert_eq!(mapping.lookup("roe.pdf").unwrap().doc_id, "A1");
        assert_eq!(mapping.lookup("20240501_smith.pdf").unwrap().doc_id, "B2");
        assert!(mapping.lookup("smith.pdf.bak").is_none());
        assert!(mapping.lookup("doe.pdf").is_none());
    }

    #[test]
    fn test_folder_listing_skips_mapping_and_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.pdf", "notes.docx", MAPPING_FILE, "c.json"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let names: Vec<String> = list_folder(dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.txt", "c.json"]);
    }

    #[tokio::test]
    async fn test_extract_all_keeps_order_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("roe.txt");
        fs::write(&good, "Contact jroe@roe-law.com").unwrap();
        let bad = dir.path().join("smith.pdf");
        fs::write(&bad, "not a pdf").unwrap();

        let catalog = PatternCatalog::new("travis");
        let extractor = Arc::new(CourtExtractor::new(&catalog, &ExtractionConfig::default()));
        let records = extract_all(
            vec![bad.clone(), good.clone()],
            extractor,
            1,
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[0].is_failure());
        assert_eq!(records[1].pdf_file(), "roe.txt");

        let records: Vec<BatchRecord> = records
            .into_iter()
            .map(|r| attach_mapping(r, &mapping()))
            .collect();
        match &records[0] {
            BatchRecord::Failed(failure) => {
                assert_eq!(failure.doc_id.as_deref(), Some("B2"));
                assert_eq!(failure.county, "travis");
            }
            BatchRecord::Extracted(_) => panic!("expected a failure"),
        }
    }

    /// One-page PDF selecting a font its page never declares.
    fn pdf_with_undeclared_font() -> Vec<u8> {
        use lopdf::{Document, Object, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let resources_id = doc.add_object(dictionary! {});
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            b"BT /F9 12 Tf 72 720 Td (x) Tj ET".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_malformed_pdf_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.pdf");
        fs::write(&bad, pdf_with_undeclared_font()).unwrap();
        let good = dir.path().join("good.txt");
        fs::write(&good, "FACTS: on or about March 1, 2024. Contact jroe@roe-law.com").unwrap();

        let catalog = PatternCatalog::new("travis");
        let extractor = Arc::new(CourtExtractor::new(&catalog, &ExtractionConfig::default()));
        let records = extract_all(vec![bad, good], extractor, 2, &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        match &records[0] {
            BatchRecord::Failed(failure) => {
                assert_eq!(failure.pdf_file, "bad.pdf");
                assert!(failure.error.contains("panicked"), "{}", failure.error);
            }
            BatchRecord::Extracted(_) => panic!("expected bad.pdf to fail"),
        }
        match &records[1] {
            BatchRecord::Extracted(result) => {
                assert_eq!(result.pdf_file, "good.txt");
                assert_eq!(result.emails.as_deref(), Some("jroe@roe-law.com"));
            }
            BatchRecord::Failed(f) => panic!("good.txt failed: {}", f.error),
        }

        let out = dir.path().join("out");
        let (json_path, csv_path) = write_outputs(&records, &out, "travis", None, false).unwrap();
        assert!(json_path.exists());
        let csv = fs::read_to_string(csv_path).unwrap();
        assert!(csv.contains("good.txt,travis"));
        assert!(csv.lines().any(|l| l.starts_with("bad.pdf,travis,") && l.contains("ERROR:")));
    }

    #[tokio::test]
    async fn test_panicked_worker_becomes_failure() {
        let outcome = tokio::task::spawn_blocking(|| -> BatchRecord { panic!("Font") }).await;
        assert!(outcome.is_err());

        match joined("bad.pdf".to_string(), "travis", outcome) {
            BatchRecord::Failed(failure) => {
                assert_eq!(failure.pdf_file, "bad.pdf");
                assert_eq!(failure.county, "travis");
                assert!(failure.error.starts_with("extraction aborted"));
            }
            BatchRecord::Extracted(_) => panic!("expected a failure"),
        }
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = PatternCatalog::new("travis");
        let extractor = CourtExtractor::new(&catalog, &ExtractionConfig::default());
        let records = vec![
            BatchRecord::Extracted(Box::new(extractor.extract_text("roe.txt", "no dates", &[]))),
            BatchRecord::Failed(BatchFailure {
                pdf_file: "smith.pdf".to_string(),
                county: "travis".to_string(),
                error: "PDF is encrypted".to_string(),
                doc_id: None,
            }),
        ];

        let (json_path, csv_path) =
            write_outputs(&records, dir.path(), "travis", None, true).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(json[1]["error"], "PDF is encrypted");

        let csv = fs::read_to_string(csv_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("PDF File,County,Doc ID"));
        assert!(lines[2].ends_with("ERROR: PDF is encrypted"));

        assert!(dir.path().join("travis").join("roe.json").exists());
        assert!(!dir.path().join("travis").join("smith.json").exists());
    }
}
