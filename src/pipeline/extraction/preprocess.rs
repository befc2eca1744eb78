//! OCR preprocessing: grayscale, 3x3 median denoise, Otsu binarization.
//!
//! The output is a lossless PNG of a strictly two-level (0/255) raster with
//! the input's dimensions.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use tracing::debug;

use super::types::ImagePreprocessor;
use super::ExtractionError;

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Maximum input image size (in bytes) before rejecting.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

const BLACK: u8 = 0;
const WHITE: u8 = 255;

// ═══════════════════════════════════════════════════════════
// Service
// ═══════════════════════════════════════════════════════════

/// Default preprocessing for printed and handwritten prescriptions.
#[derive(Debug, Clone)]
pub struct BinarizingPreprocessor {
    /// Run the 3x3 median filter before thresholding.
    pub denoise: bool,
}

impl Default for BinarizingPreprocessor {
    fn default() -> Self {
        Self { denoise: true }
    }
}

impl ImagePreprocessor for BinarizingPreprocessor {
    fn preprocess(&self, image_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
        validate_image_bytes(image_bytes)?;

        let decoded = image::load_from_memory(image_bytes)
            .map_err(|e| ExtractionError::UnreadableInput(format!("Could not decode image: {e}")))?;

        let gray = decoded.to_luma8();
        let filtered = if self.denoise { median_3x3(&gray) } else { gray };
        let threshold = otsu_threshold(&filtered);
        let binary = binarize(&filtered, threshold);

        debug!(
            width = binary.width(),
            height = binary.height(),
            threshold,
            "Binarized image for OCR"
        );

        encode_png(binary)
    }
}

// ═══════════════════════════════════════════════════════════
// Pure helper functions
// ═══════════════════════════════════════════════════════════

/// Reject clearly invalid input before decoding.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), ExtractionError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(ExtractionError::UnreadableInput(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ExtractionError::UnreadableInput(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// 3x3 median filter. Edge pixels replicate their nearest neighbour.
pub fn median_3x3(img: &GrayImage) -> GrayImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return img.clone();
    }

    GrayImage::from_fn(w, h, |x, y| {
        let mut window = [0u8; 9];
        let mut i = 0;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let nx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                let ny = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                window[i] = img.get_pixel(nx, ny).0[0];
                i += 1;
            }
        }
        window.sort_unstable();
        Luma([window[4]])
    })
}

/// Otsu's threshold: the level maximizing between-class variance.
/// Ties keep the lowest level.
pub fn otsu_threshold(img: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in img.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total = (img.width() as u64 * img.height() as u64) as f64;
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut background_weight = 0.0;
    let mut background_sum = 0.0;
    let mut best_variance = 0.0;
    let mut threshold = 0u8;

    for (level, &count) in histogram.iter().enumerate() {
        background_weight += count as f64;
        if background_weight == 0.0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0.0 {
            break;
        }

        background_sum += level as f64 * count as f64;
        let background_mean = background_sum / background_weight;
        let foreground_mean = (weighted_total - background_sum) / foreground_weight;

        let variance =
            background_weight * foreground_weight * (background_mean - foreground_mean).powi(2);
        if variance > best_variance {
            best_variance = variance;
            threshold = level as u8;
        }
    }

    threshold
}

/// Pixels strictly above `threshold` become white, the rest black.
pub fn binarize(img: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold { WHITE } else { BLACK };
    }
    out
}

/// Encode a grayscale image as PNG bytes (lossless).
pub fn encode_png(img: GrayImage) -> Result<Vec<u8>, ExtractionError> {
    let dynamic = DynamicImage::ImageLuma8(img);
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}
