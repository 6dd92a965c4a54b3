//! Scan command - extract fields from a single image file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use fieldscan_core::{create_recognizer, FieldMap, FieldscanConfig, Scanner};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Input image (PNG, JPEG, ...)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory (overrides config)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Also print the recognized text to stderr
    #[arg(long)]
    raw: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON object, as returned by `POST /ocr`
    Json,
    /// JSON list of `{item_name, item_value}`
    Items,
    /// One `key: value` per line
    Text,
}

pub async fn run(args: ScanArgs, mut config: FieldscanConfig) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if let Some(model_dir) = &args.model_dir {
        config.models.model_dir = model_dir.clone();
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading OCR engine...");
    let recognizer = create_recognizer(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialise OCR engine: {}", e))?;
    let scanner = Scanner::from_config(&config, recognizer);

    pb.set_message("Running OCR...");
    let bytes = fs::read(&args.input)?;
    let result = scanner.scan(&bytes);
    pb.finish_and_clear();

    let output = result?;

    if args.raw {
        eprintln!("{}", style("Recognized text:").blue());
        eprintln!("{}", output.raw_text);
        eprintln!();
    }

    let formatted = format_fields(&output.fields, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &formatted)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", formatted);
    }

    debug!(
        "Image {}x{}, {} fields, total time {:?}",
        output.image_size.0,
        output.image_size.1,
        output.fields.len(),
        start.elapsed()
    );

    Ok(())
}

fn format_fields(fields: &FieldMap, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(fields)?),
        OutputFormat::Items => Ok(serde_json::to_string_pretty(&fields.to_items())?),
        OutputFormat::Text => Ok(fields
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
