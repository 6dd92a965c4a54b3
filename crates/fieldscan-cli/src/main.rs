//! CLI for image-to-fields OCR extraction.

mod commands;
mod logging;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use commands::{config, scan, serve};
use fieldscan_core::FieldscanConfig;

/// fieldscan - OCR images and extract "key: value" fields
#[derive(Parser)]
#[command(name = "fieldscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP OCR service
    Serve(serve::ServeArgs),

    /// Extract fields from a local image file
    Scan(scan::ScanArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let config = match &cli.command {
        Commands::Config(args) if !args.reads_config() => FieldscanConfig::default(),
        // `config` subcommands may create the file, so it need not exist yet
        Commands::Config(_) => load_config(&config_path, false)?,
        _ => load_config(&config_path, cli.config.is_some())?,
    };

    // The service logs requests at info by default
    let verbose = match cli.command {
        Commands::Serve(_) => cli.verbose.max(1),
        _ => cli.verbose,
    };
    logging::init(verbose, config.server.log_dir.as_deref())?;

    match cli.command {
        Commands::Serve(args) => serve::run(args, config).await,
        Commands::Scan(args) => scan::run(args, config).await,
        Commands::Config(args) => config::run(args, &config_path, config).await,
    }
}

/// Load the config file; a missing file means defaults unless it was asked for explicitly.
fn load_config(path: &Path, required: bool) -> anyhow::Result<FieldscanConfig> {
    if path.exists() {
        Ok(FieldscanConfig::from_file(path)?)
    } else if required {
        anyhow::bail!("Config file not found: {}", path.display())
    } else {
        Ok(FieldscanConfig::default())
    }
}
