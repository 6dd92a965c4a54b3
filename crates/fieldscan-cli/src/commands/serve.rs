//! Serve command - run the HTTP OCR service.

use clap::Args;
use tracing::info;

use fieldscan_core::{create_recognizer, FieldscanConfig, Scanner};
use fieldscan_server::AppState;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs, mut config: FieldscanConfig) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let recognizer = create_recognizer(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialise OCR engine: {}", e))?;
    let scanner = Scanner::from_config(&config, recognizer);

    info!(
        "Starting OCR service on http://{} (engine: {})",
        config.server.bind_address(),
        scanner.recognizer_name()
    );

    fieldscan_server::serve(&config.server, AppState::new(scanner)).await
}
