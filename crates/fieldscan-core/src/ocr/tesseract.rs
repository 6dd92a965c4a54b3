//! Tesseract backend through `leptess`.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Instant;

use image::{DynamicImage, ImageFormat};
use leptess::LepTess;
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::TextRecognizer;

/// Tesseract engine. A fresh `LepTess` handle is created per call, so the
/// engine holds no native state and is freely shareable.
pub struct TesseractEngine {
    data_path: Option<PathBuf>,
    language: String,
}

impl TesseractEngine {
    pub fn new(data_path: Option<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            data_path,
            language: language.into(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.tessdata_dir.clone(), config.language.clone())
    }
}

impl TextRecognizer for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();

        // leptonica reads encoded bytes, not raw pixels
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let data_path = self.data_path.as_ref().and_then(|p| p.to_str());
        let mut lt = LepTess::new(data_path, &self.language)
            .map_err(|e| OcrError::ModelLoad(format!("tesseract init: {}", e)))?;
        lt.set_image_from_mem(&png)
            .map_err(|e| OcrError::InvalidImage(format!("tesseract: {}", e)))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(format!("tesseract: {}", e)))?;

        debug!("Tesseract language: {}", self.language);
        info!(
            "OCR complete: {} chars in {}ms",
            text.chars().count(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}
