//! Catalog command - check a pattern catalog before running it.

use std::path::PathBuf;

use clap::Args;
use console::style;

use docket_core::{CourtExtractor, PatternCatalog};

use super::load_config;

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Pattern catalog file
    #[arg(required = true)]
    file: PathBuf,

    /// Exit with an error when any field or sub-pattern is unusable
    #[arg(long)]
    strict: bool,
}

pub async fn run(args: CatalogArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let catalog = PatternCatalog::from_file(&args.file)?;
    let extractor = CourtExtractor::new(&catalog, &config.extraction);

    println!(
        "{} {} (county: {})",
        style("Catalog").bold(),
        args.file.display(),
        extractor.county()
    );
    println!();

    let compiled: Vec<(&str, &str)> = extractor
        .field_kinds()
        .map(|(name, kind)| (name, kind.as_str()))
        .collect();
    let mut problems = 0;

    for name in &catalog.extraction_order {
        match compiled.iter().find(|(field, _)| *field == name.as_str()) {
            Some((_, kind)) => println!("  {} {:<32} {}", style("✓").green(), name, kind),
            None => {
                problems += 1;
                let reason = match catalog.pattern(name) {
                    None => "not defined",
                    Some(pattern) if pattern.kind().is_none() => "unknown type",
                    Some(_) => "no usable pattern",
                };
                println!("  {} {:<32} {}", style("✗").red(), name, style(reason).red());
            }
        }
    }

    let errors = extractor.pattern_errors();
    if !errors.is_empty() {
        println!();
        println!("{}", style("Pattern errors:").yellow());
        for error in errors {
            println!("  - {}", error);
        }
    }

    println!();
    println!(
        "{} fields usable, {} unusable, {} pattern errors",
        style(compiled.len()).green(),
        style(problems).red(),
        style(errors.len()).yellow()
    );

    if args.strict && (problems > 0 || !errors.is_empty()) {
        anyhow::bail!("Catalog {} has unusable patterns", args.file.display());
    }
    Ok(())
}
