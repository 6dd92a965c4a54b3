//! Image decoding and preprocessing for OCR.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Decodes uploaded bytes and prepares the bitmap for recognition.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Maximum image dimension.
    max_size: u32,
    /// Apply adaptive thresholding.
    enhance: bool,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self {
            max_size: 2048,
            enhance: false,
        }
    }

    /// Create a preprocessor from OCR settings.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new()
            .with_max_size(config.max_image_size)
            .with_enhance(config.enhance)
    }

    /// Set maximum image dimension.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size;
        self
    }

    /// Enable or disable binarisation.
    pub fn with_enhance(mut self, enhance: bool) -> Self {
        self.enhance = enhance;
        self
    }

    /// Decode image bytes (PNG, JPEG, ...) into a bitmap.
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, OcrError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!(
                "image has zero size: {}x{}",
                width, height
            )));
        }

        debug!("Decoded image: {}x{}, {} bytes", width, height, bytes.len());
        Ok(image)
    }

    /// Downscale oversized images and optionally binarise.
    pub fn prepare(&self, image: DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        let (new_width, new_height) = self.calculate_resize_dimensions(width, height, self.max_size);

        let image = if (new_width, new_height) != (width, height) {
            debug!(
                "Resizing image {}x{} -> {}x{}",
                width, height, new_width, new_height
            );
            image.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
        } else {
            image
        };

        if self.enhance {
            self.enhance(&image)
        } else {
            image
        }
    }

    /// Apply basic image enhancement for better OCR.
    pub fn enhance(&self, image: &DynamicImage) -> DynamicImage {
        let gray = image.to_luma8();
        let enhanced = self.adaptive_threshold(&gray, 15, 5);
        DynamicImage::ImageLuma8(enhanced)
    }

    fn calculate_resize_dimensions(
        &self,
        width: u32,
        height: u32,
        target_size: u32,
    ) -> (u32, u32) {
        let max_dim = width.max(height);

        if target_size == 0 || max_dim <= target_size {
            return (width, height);
        }

        let scale = target_size as f32 / max_dim as f32;
        let new_width = (width as f32 * scale) as u32;
        let new_height = (height as f32 * scale) as u32;

        (new_width.max(1), new_height.max(1))
    }

    fn adaptive_threshold(&self, image: &GrayImage, block_size: u32, c: i32) -> GrayImage {
        let (width, height) = image.dimensions();
        let mut result = GrayImage::new(width, height);

        let half_block = block_size / 2;

        for y in 0..height {
            for x in 0..width {
                let mut sum = 0u32;
                let mut count = 0u32;

                let y_start = y.saturating_sub(half_block);
                let y_end = (y + half_block + 1).min(height);
                let x_start = x.saturating_sub(half_block);
                let x_end = (x + half_block + 1).min(width);

                for ly in y_start..y_end {
                    for lx in x_start..x_end {
                        sum += image.get_pixel(lx, ly)[0] as u32;
                        count += 1;
                    }
                }

                let threshold = (sum / count) as i32 - c;
                let pixel_value = image.get_pixel(x, y)[0] as i32;

                let output = if pixel_value > threshold { 255 } else { 0 };
                result.put_pixel(x, y, Luma([output]));
            }
        }

        result
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}
