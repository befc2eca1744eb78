//! First-page PDF rasterization via Google PDFium.
//!
//! `PdfiumRenderer` is stateless (`Send + Sync`). Each render binds a fresh
//! `Pdfium` instance because the upstream type is `!Send`; the OS caches the
//! library load, so repeat binds are cheap.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::types::PdfRasterizer;
use super::ExtractionError;

/// Render resolution. Tesseract is tuned for roughly 300 DPI input.
pub const DEFAULT_RENDER_DPI: u32 = 300;

/// Upper bound on either rendered dimension.
const MAX_DIMENSION_PX: u32 = 4096;

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Clone)]
pub struct PdfiumRenderer {
    /// Explicit library file. `None` searches next to the executable, then
    /// the system library paths.
    library: Option<PathBuf>,
    dpi: u32,
}

impl PdfiumRenderer {
    /// Verifies the library binds before returning.
    pub fn new(library: Option<&Path>) -> Result<Self, ExtractionError> {
        let renderer = Self {
            library: library.map(Path::to_path_buf),
            dpi: DEFAULT_RENDER_DPI,
        };
        load_pdfium(renderer.library.as_deref())?;
        Ok(renderer)
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

/// Bind the PDFium dynamic library.
///
/// An explicit path is authoritative. Otherwise: alongside the running
/// executable, then the system search paths.
fn load_pdfium(library: Option<&Path>) -> Result<Pdfium, ExtractionError> {
    if let Some(path) = library {
        let bindings = Pdfium::bind_to_library(path).map_err(|e| {
            ExtractionError::UnsupportedFormat(format!(
                "PDF support unavailable: cannot load PDFium from {}: {e}",
                path.display()
            ))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        let lib_path =
            Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
        if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
            debug!(dir = %exe_dir.display(), "Loaded PDFium next to executable");
            return Ok(Pdfium::new(bindings));
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        ExtractionError::UnsupportedFormat(format!(
            "PDF support unavailable: PDFium library not found: {e}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

/// Pixel size for a page at `dpi`, both sides clamped to [1, MAX_DIMENSION_PX]
/// with the aspect ratio kept.
fn compute_render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let raw_w = (width_points * dpi as f32 / POINTS_PER_INCH).max(1.0);
    let raw_h = (height_points * dpi as f32 / POINTS_PER_INCH).max(1.0);

    let largest = raw_w.max(raw_h);
    if largest > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / largest;
        let w = ((raw_w * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PdfRasterizer for PdfiumRenderer {
    fn render_first_page(&self, pdf_path: &Path) -> Result<Vec<u8>, ExtractionError> {
        let pdf_bytes = std::fs::read(pdf_path).map_err(|e| {
            ExtractionError::UnreadableInput(format!("{}: {e}", pdf_path.display()))
        })?;

        let pdfium = load_pdfium(self.library.as_deref())?;
        let document = pdfium
            .load_pdf_from_byte_slice(&pdf_bytes, None)
            .map_err(|e| {
                ExtractionError::UnreadableInput(format!("Could not convert PDF to image: {e}"))
            })?;

        let page = document.pages().get(0).map_err(|_| {
            ExtractionError::UnreadableInput("Could not convert PDF to image: no pages".into())
        })?;

        let width_points = page.width().value;
        let height_points = page.height().value;
        let (target_w, target_h) = compute_render_dimensions(width_points, height_points, self.dpi);

        let uncapped_w = (width_points * self.dpi as f32 / POINTS_PER_INCH) as u32;
        let uncapped_h = (height_points * self.dpi as f32 / POINTS_PER_INCH) as u32;
        if uncapped_w.max(uncapped_h) > MAX_DIMENSION_PX {
            warn!(
                raw_width = uncapped_w,
                raw_height = uncapped_h,
                capped_width = target_w,
                capped_height = target_h,
                "Page dimensions capped to {MAX_DIMENSION_PX}px"
            );
        }

        let config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| ExtractionError::PdfRendering(format!("Rendering failed: {e}")))?;

        let mut cursor = Cursor::new(Vec::new());
        bitmap
            .as_image()
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
        let png_bytes = cursor.into_inner();

        debug!(
            pdf = %pdf_path.display(),
            width = target_w,
            height = target_h,
            png_size = png_bytes.len(),
            "Rendered first PDF page"
        );
        Ok(png_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_page_at_300_dpi() {
        let (w, h) = compute_render_dimensions(612.0, 792.0, DEFAULT_RENDER_DPI);
        assert_eq!((w, h), (2550, 3300));
    }

    #[test]
    fn oversized_page_is_capped_keeping_aspect() {
        let (w, h) = compute_render_dimensions(1224.0, 1584.0, 300);
        assert_eq!(h, MAX_DIMENSION_PX);
        assert!(w < MAX_DIMENSION_PX);
        let ratio = w as f32 / h as f32;
        assert!((ratio - 1224.0 / 1584.0).abs() < 0.01);
    }

    #[test]
    fn degenerate_page_is_at_least_one_pixel() {
        assert_eq!(compute_render_dimensions(0.0, 0.0, 300), (1, 1));
    }

    #[test]
    fn missing_library_means_pdf_unsupported() {
        let err = PdfiumRenderer::new(Some(Path::new("/nonexistent/rxscan-test/libpdfium.so")))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
    }
}
