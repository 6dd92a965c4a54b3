//! Core library for image-to-fields extraction.
//!
//! This crate provides:
//! - Image decoding and light preprocessing
//! - OCR backends behind the [`TextRecognizer`] trait (pure ONNX, optional Tesseract)
//! - Key-value field extraction from recognized text
//! - The [`Scanner`] pipeline tying the three together

pub mod error;
pub mod fields;
pub mod models;
pub mod ocr;
pub mod scan;

pub use error::{FieldscanError, Result};
pub use fields::{extract_fields, FieldItem, FieldMap, KeyValueExtractor};
pub use models::config::{FieldscanConfig, OcrBackend};
pub use ocr::{create_recognizer, ImagePreprocessor, TextRecognizer};
pub use scan::{ScanError, ScanOutput, Scanner};
