//! OCR backends.
//!
//! Every backend implements [`TextRecognizer`]: a decoded image in, plain
//! text (one recognized line per `\n`) out.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;
#[cfg(feature = "tesseract")]
mod tesseract;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;

pub use crate::models::config::OcrBackend;

use std::sync::Arc;

use image::DynamicImage;
use tracing::info;

use crate::error::OcrError;
use crate::models::config::FieldscanConfig;

/// An OCR engine that turns a bitmap into text.
pub trait TextRecognizer: Send + Sync {
    /// Engine identifier used in logs.
    fn name(&self) -> &'static str;

    /// Recognize all text in the image.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Create the recognizer selected by `config.ocr.backend`.
pub fn create_recognizer(config: &FieldscanConfig) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    let recognizer = build_recognizer(config)?;

    info!("Using OCR backend: {}", recognizer.name());
    Ok(recognizer)
}

fn build_recognizer(config: &FieldscanConfig) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    match config.ocr.backend {
        #[cfg(feature = "native")]
        OcrBackend::Pure => Ok(Arc::new(PureOcrEngine::from_config(config)?)),
        #[cfg(feature = "tesseract")]
        OcrBackend::Tesseract => Ok(Arc::new(TesseractEngine::from_config(&config.ocr))),
        #[allow(unreachable_patterns)]
        other => Err(OcrError::NotAvailable(other.to_string())),
    }
}

/// A recognized line of text with its location.
#[derive(Debug, Clone)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Sort boxes by reading order (top-to-bottom, left-to-right).
pub fn sort_by_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();

        // Group by approximate vertical position (within 20 pixels)
        let row_a = (ay / 20.0) as i32;
        let row_b = (by / 20.0) as i32;

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

/// Join box texts into newline-separated plain text.
pub fn join_lines(boxes: &[TextBox]) -> String {
    boxes
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_box(text: &str, x: f32, y: f32) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_reading_order() {
        let mut boxes = vec![
            text_box("张三", 120.0, 42.0),
            text_box("Name:", 10.0, 5.0),
            text_box("Alice", 80.0, 8.0),
            text_box("姓名：", 10.0, 45.0),
        ];

        sort_by_reading_order(&mut boxes);

        let order: Vec<&str> = boxes.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(order, vec!["Name:", "Alice", "姓名：", "张三"]);
        assert_eq!(join_lines(&boxes), "Name:\nAlice\n姓名：\n张三");
    }

    #[test]
    fn test_rect() {
        let b = text_box("x", 10.0, 20.0);
        assert_eq!(b.rect(), (10.0, 20.0, 60.0, 30.0));
    }

    #[test]
    fn test_unavailable_backend() {
        let mut config = FieldscanConfig::default();
        config.ocr.backend = OcrBackend::Tesseract;

        if cfg!(not(feature = "tesseract")) {
            let err = create_recognizer(&config).err().unwrap();
            assert!(matches!(err, OcrError::NotAvailable(ref name) if name == "tesseract"));
        }
    }
}
