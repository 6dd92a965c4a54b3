//! Route handlers.

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, Instrument, Span};
use uuid::Uuid;

use fieldscan_core::{FieldItem, FieldMap, ScanError, ScanOutput};

use crate::error::ApiError;
use crate::server::AppState;

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Response of the upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub result: Vec<FieldItem>,
}

/// POST /ocr - extract fields from raw image bytes
///
/// # Errors
/// - 400 Bad Request: empty body
/// - 500 Internal Server Error: undecodable image or OCR failure
pub async fn ocr_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FieldMap>, ApiError> {
    let span = info_span!("scan", request_id = %Uuid::new_v4());

    async move {
        info!("OCR request received");
        let output = run_scan(&state, body).await?;
        debug!("Returning fields: {:?}", output.fields);
        Ok::<_, ApiError>(Json(output.fields))
    }
    .instrument(span)
    .await
}

/// POST /api/imageocr/solve - extract fields from a multipart upload
///
/// Reads the file field named `image` and returns the fields as a list of
/// `{item_name, item_value}` objects.
pub async fn solve_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SolveResponse>, ApiError> {
    let span = info_span!("solve", request_id = %Uuid::new_v4());

    async move {
        info!("Upload request received");
        let mut multipart = multipart.map_err(|e| {
            debug!("Multipart rejected: {}", e);
            ApiError::UploadFailed
        })?;

        let image = read_image_field(&mut multipart).await?;
        let output = run_scan(&state, image).await?;

        Ok::<_, ApiError>(Json(SolveResponse {
            result: output.fields.to_items(),
        }))
    }
    .instrument(span)
    .await
}

/// GET /health
pub async fn health_handler() -> &'static str {
    "OK"
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        ApiError::UploadFailed
    })? {
        if field.name() == Some("image") {
            return field.bytes().await.map_err(|e| {
                debug!("Failed to read image field: {}", e);
                ApiError::UploadFailed
            });
        }
    }

    Err(ApiError::UploadFailed)
}

/// Run the scanner on the blocking pool, keeping the request span.
async fn run_scan(state: &AppState, bytes: Bytes) -> Result<ScanOutput, ScanError> {
    if bytes.is_empty() {
        return Err(ScanError::InputMissing);
    }

    let scanner = state.scanner.clone();
    let span = Span::current();

    tokio::task::spawn_blocking(move || span.in_scope(|| scanner.scan(&bytes)))
        .await
        .map_err(|e| ScanError::EngineFailure(format!("OCR task failed: {}", e)))?
}
