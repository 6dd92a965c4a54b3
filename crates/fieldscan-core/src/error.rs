//! Error types for the fieldscan-core library.

use thiserror::Error;

/// Main error type for the fieldscan library.
#[derive(Error, Debug)]
pub enum FieldscanError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models or initialise the engine.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The requested backend was not compiled in.
    #[error("OCR backend '{0}' is not available in this build")]
    NotAvailable(String),
}

/// Result type for the fieldscan library.
pub type Result<T> = std::result::Result<T, FieldscanError>;
