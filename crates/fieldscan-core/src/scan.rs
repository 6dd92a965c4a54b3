//! Image bytes to fields: decode, recognize, extract.

use std::sync::Arc;
use std::time::Instant;

use image::GenericImageView;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::OcrError;
use crate::fields::{FieldMap, KeyValueExtractor};
use crate::models::config::FieldscanConfig;
use crate::ocr::{ImagePreprocessor, TextRecognizer};

/// Failure of a single scan, by kind.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The request carried no image bytes.
    #[error("no image data received")]
    InputMissing,

    /// The bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    DecodeFailure(String),

    /// The OCR engine failed.
    #[error("OCR engine failed: {0}")]
    EngineFailure(String),
}

impl ScanError {
    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ScanError::InputMissing)
    }

    /// Stable name of the error kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::InputMissing => "input_missing",
            ScanError::DecodeFailure(_) => "decode_failure",
            ScanError::EngineFailure(_) => "engine_failure",
        }
    }
}

impl From<OcrError> for ScanError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::InvalidImage(msg) => ScanError::DecodeFailure(msg),
            other => ScanError::EngineFailure(other.to_string()),
        }
    }
}

/// Result of a successful scan.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// Extracted fields.
    pub fields: FieldMap,
    /// Text as returned by the OCR engine.
    pub raw_text: String,
    /// Decoded image dimensions (width, height).
    pub image_size: (u32, u32),
    /// Total processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// The decode → recognize → extract pipeline.
///
/// Cheap to clone; the recognizer is shared.
#[derive(Clone)]
pub struct Scanner {
    recognizer: Arc<dyn TextRecognizer>,
    preprocessor: ImagePreprocessor,
    extractor: KeyValueExtractor,
}

impl Scanner {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            preprocessor: ImagePreprocessor::new(),
            extractor: KeyValueExtractor::new(),
        }
    }

    /// Build a scanner with preprocessing and extraction settings from config.
    pub fn from_config(config: &FieldscanConfig, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            preprocessor: ImagePreprocessor::from_config(&config.ocr),
            extractor: KeyValueExtractor::new()
                .with_fallback_prefix(config.extraction.fallback_prefix.clone()),
        }
    }

    pub fn recognizer_name(&self) -> &'static str {
        self.recognizer.name()
    }

    /// Run the full pipeline over encoded image bytes.
    ///
    /// Blocking and CPU-bound; async callers should run it off the reactor.
    pub fn scan(&self, bytes: &[u8]) -> Result<ScanOutput, ScanError> {
        if bytes.is_empty() {
            return Err(ScanError::InputMissing);
        }

        let start = Instant::now();
        info!("Received image data: {} bytes", bytes.len());

        let image = self
            .preprocessor
            .decode(bytes)
            .map_err(|e| ScanError::DecodeFailure(e.to_string()))?;
        let image_size = image.dimensions();
        let image = self.preprocessor.prepare(image);

        let raw_text = self
            .recognizer
            .recognize(&image)
            .map_err(ScanError::from)?;
        debug!("Recognized text length: {}", raw_text.len());

        let fields = self.extractor.extract(&raw_text);
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extracted {} fields in {}ms",
            fields.len(),
            processing_time_ms
        );

        Ok(ScanOutput {
            fields,
            raw_text,
            image_size,
            processing_time_ms,
        })
    }
}
