//! HTTP service for image-to-fields extraction.
//!
//! Routes:
//! - `POST /ocr` - raw image bytes in, JSON field map out
//! - `POST /api/imageocr/solve` - multipart upload (`image` field), list of items out
//! - `GET /health` - liveness check

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use handlers::{ErrorBody, SolveResponse};
pub use server::{create_app, serve, AppState};
