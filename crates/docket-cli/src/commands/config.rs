//! Config command - inspect and edit the docket configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use docket_core::DocketConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init(InitArgs),

    /// Print one value (e.g. "extraction.contact_window_chars")
    Get {
        /// Dotted configuration key
        key: String,
    },

    /// Change one value; JSON literals are parsed, anything else is a string
    Set {
        /// Dotted configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show the configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for the configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

/// `~/.config/docket/config.json` or the platform equivalent.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docket")
        .join("config.json")
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, &path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

fn read_or_default(path: &Path) -> anyhow::Result<DocketConfig> {
    if path.exists() {
        Ok(DocketConfig::from_file(path)?)
    } else {
        Ok(DocketConfig::default())
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} No config file at {}, showing defaults.",
            style("ℹ").blue(),
            path.display()
        );
    }
    let config = read_or_default(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(args: InitArgs, path: &Path) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| path.to_path_buf());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    DocketConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );
    Ok(())
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(read_or_default(path)?)?;
    let value = lookup(&json, key)
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set_config(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let parsed: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(read_or_default(path)?)?;
    assign(&mut json, key, parsed.clone())?;

    // round-trip through the typed config so bad values are rejected here
    let config: DocketConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed)?
    );
    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'docket config init' to create a configuration file.");
    }
    Ok(())
}

/// Follow a dotted key through nested objects.
fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Replace the value at an existing dotted key. Unknown keys are refused,
/// since the typed config would silently drop them.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let slot = key
        .split('.')
        .try_fold(json, |current, part| current.get_mut(part))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_dotted_key() {
        let config = serde_json::to_value(DocketConfig::default()).unwrap();
        assert_eq!(
            lookup(&config, "extraction.contact_window_chars"),
            Some(&json!(500))
        );
        assert_eq!(lookup(&config, "extraction.nope"), None);
        assert_eq!(lookup(&config, "output.output_dir.deeper"), None);
    }

    #[test]
    fn test_assign_existing_key_only() {
        let mut config = serde_json::to_value(DocketConfig::default()).unwrap();

        assign(&mut config, "extraction.email_domain_case_insensitive", json!(true)).unwrap();
        assert_eq!(config["extraction"]["email_domain_case_insensitive"], json!(true));

        assert!(assign(&mut config, "extraction.typo", json!(1)).is_err());
        assert!(config["extraction"].get("typo").is_none());
    }

    #[test]
    fn test_set_rejects_mistyped_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        assert!(set_config(&path, "extraction.contact_window_chars", "lots").is_err());
        assert!(!path.exists());

        set_config(&path, "extraction.contact_window_chars", "300").unwrap();
        let config = DocketConfig::from_file(&path).unwrap();
        assert_eq!(config.extraction.contact_window_chars, 300);
    }
}
