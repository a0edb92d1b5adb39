//! CLI subcommands and the loaders they share.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use docket_core::models::config::DocketConfig;
use docket_core::{LayoutDocument, PatternCatalog, PdfExtractor, PlainTextSource, TextSource};

/// Input extensions the CLI knows how to read.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "json"];

/// Load `--config`, else the user config file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DocketConfig> {
    if let Some(path) = config_path {
        return Ok(DocketConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        Ok(DocketConfig::from_file(&default_path)?)
    } else {
        Ok(DocketConfig::default())
    }
}

/// Pick the pattern catalog: `--patterns`, then the configured file, then
/// discovery in the configured patterns directory. Anything unusable falls
/// back to an empty catalog.
pub fn load_catalog(
    patterns: Option<&Path>,
    county: Option<&str>,
    config: &DocketConfig,
) -> PatternCatalog {
    let path: Option<PathBuf> = match patterns.or(config.catalog.patterns_file.as_deref()) {
        Some(path) => Some(path.to_path_buf()),
        None => match PatternCatalog::discover(&config.catalog.patterns_dir, county) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("{}; continuing with an empty pattern catalog", e);
                None
            }
        },
    };

    match path {
        Some(path) => {
            debug!("Loading pattern catalog {}", path.display());
            PatternCatalog::load_or_empty(&path)
        }
        None => PatternCatalog::default(),
    }
}

/// Open a document as a text source, by extension.
pub fn open_source(path: &Path) -> anyhow::Result<Box<dyn TextSource>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let source: Box<dyn TextSource> = match extension.as_str() {
        "pdf" => Box::new(PdfExtractor::from_bytes(&fs::read(path)?)?),
        "txt" => Box::new(PlainTextSource::new(fs::read_to_string(path)?)),
        "json" => Box::new(LayoutDocument::from_json(&fs::read(path)?)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };
    Ok(source)
}

/// File name of a path, for records and messages.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
