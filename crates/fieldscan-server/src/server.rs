//! Router construction and the listen loop.

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use fieldscan_core::models::config::ServerConfig;
use fieldscan_core::Scanner;

use crate::handlers::{health_handler, ocr_handler, solve_handler};

/// Application state shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub scanner: Scanner,
}

impl AppState {
    pub fn new(scanner: Scanner) -> Self {
        Self { scanner }
    }
}

/// Build the router with all routes and layers.
pub fn create_app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/ocr", post(ocr_handler))
        .route("/api/imageocr/solve", post(solve_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
#[instrument(skip_all)]
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = create_app(state, config.max_body_bytes);
    let addr = config.bind_address();

    let listener = TcpListener::bind(&addr).await?;
    info!("OCR service listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("OCR service stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
