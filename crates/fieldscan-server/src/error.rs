//! Error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use fieldscan_core::ScanError;

use crate::handlers::ErrorBody;

/// Any failure a handler can report. Rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// The pipeline failed.
    Scan(ScanError),
    /// The multipart form had no readable `image` field.
    UploadFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Scan(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Scan(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UploadFailed => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Scan(err) => err.to_string(),
            ApiError::UploadFailed => "image upload failed".to_string(),
        }
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        ApiError::Scan(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        match &self {
            ApiError::Scan(err) => warn!(kind = err.kind(), "Scan failed: {}", message),
            ApiError::UploadFailed => warn!("Upload rejected: {}", message),
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
