//! # First-Page PDF Rasterization
//!
//! Renders the first page of a PDF byte stream into an [`RgbaImage`] whose
//! width equals the printer's dot width. Receipts and order chits are
//! single-page documents; any further pages are truncated.
//!
//! The page is rendered against an opaque white background so that
//! transparent PDF backgrounds threshold as paper rather than ink.

use image::{Rgba, RgbaImage, imageops::FilterType};
use mupdf::{Colorspace, Document, Matrix};

use crate::error::PrintError;

/// Render page one of `pdf_bytes` scaled so the output width equals
/// `target_width_dots` (minimum 1), height scaled by the same ratio
/// (minimum 1).
///
/// Fails with [`PrintError::Render`] on corrupt or unreadable input.
pub fn render_first_page(pdf_bytes: &[u8], target_width_dots: u32) -> Result<RgbaImage, PrintError> {
    let target_width = target_width_dots.max(1);

    let doc = Document::from_bytes(pdf_bytes, "application/pdf")
        .map_err(|e| PrintError::Render(format!("Failed to open PDF: {e}")))?;

    let page = doc
        .load_page(0)
        .map_err(|e| PrintError::Render(format!("Failed to load first page: {e}")))?;

    let bounds = page
        .bounds()
        .map_err(|e| PrintError::Render(format!("Failed to read page bounds: {e}")))?;
    let page_width = bounds.x1 - bounds.x0;
    let page_height = bounds.y1 - bounds.y0;
    if page_width <= 0.0 || page_height <= 0.0 {
        return Err(PrintError::Render("Page has no printable area".to_string()));
    }

    let scale = target_width as f32 / page_width;
    let target_height = ((page_height * scale).round() as u32).max(1);

    // No alpha channel: MuPDF clears the pixmap to white before drawing.
    let rgb = Colorspace::device_rgb();
    let transform = Matrix::new_scale(scale, scale);
    let pixmap = page
        .to_pixmap(&transform, &rgb, false, false)
        .map_err(|e| PrintError::Render(format!("Failed to render page: {e}")))?;

    let mut image = pixmap_to_rgba(&pixmap)?;

    // MuPDF rounds the pixmap bounds itself; force the exact dot width the
    // raster encoder was promised.
    if image.width() != target_width || image.height() != target_height {
        image = image::imageops::resize(&image, target_width, target_height, FilterType::Lanczos3);
    }

    Ok(image)
}

/// Copy pixmap samples into an owned RGBA image, honoring the row stride.
fn pixmap_to_rgba(pixmap: &mupdf::Pixmap) -> Result<RgbaImage, PrintError> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(PrintError::Render(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err(PrintError::Render("Pixmap buffer size mismatch".to_string()));
    }

    let mut image = RgbaImage::new(width as u32, height as u32);
    for y in 0..height {
        let row = &samples[y * stride..y * stride + row_bytes];
        for (x, px) in row.chunks_exact(n).enumerate() {
            image.put_pixel(x as u32, y as u32, Rgba([px[0], px[1], px[2], 255]));
        }
    }

    Ok(image)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage_input() {
        let result = render_first_page(b"definitely not a pdf", 384);
        assert!(matches!(result, Err(PrintError::Render(_))));
    }

    #[test]
    fn test_rejects_empty_input() {
        let result = render_first_page(&[], 384);
        assert!(matches!(result, Err(PrintError::Render(_))));
    }

    // Rendering against real PDF bytes is covered by the integration tests,
    // which assemble a minimal single-page document.
}
