//! `docket` command line: incident dates, contacts and e-mails from court filings.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{batch, catalog, config, process};

/// docket - Extract incident dates and contacts from court filings
#[derive(Parser)]
#[command(name = "docket", author, version, about, long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: the user config dir)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a single document
    Process(process::ProcessArgs),

    /// Extract every document in a folder or glob
    Batch(batch::BatchArgs),

    /// Check a pattern catalog
    Catalog(catalog::CatalogArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

impl Commands {
    async fn run(self, config_path: Option<&str>) -> anyhow::Result<()> {
        match self {
            Commands::Process(args) => process::run(args, config_path).await,
            Commands::Batch(args) => batch::run(args, config_path).await,
            Commands::Catalog(args) => catalog::run(args, config_path).await,
            Commands::Config(args) => config::run(args, config_path).await,
        }
    }
}

/// Directive for our own crates at a given `-v` count. Dependencies stay
/// at `warn` so lopdf noise does not drown the extraction trace.
fn log_directive(verbose: u8) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("warn,docket={level},docket_core={level}")
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| log_directive(verbose).into());

    // stderr keeps JSON and CSV on stdout pipeable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("could not install logger: {}", e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    cli.command.run(cli.config.as_deref()).await
}
