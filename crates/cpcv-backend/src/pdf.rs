//! PDF rasterization into JPEG page fragments.
//!
//! Each page is rendered at twice its native size so small print (ID and
//! registry numbers) stays legible, then JPEG-encoded. Pages are rendered
//! one after another on a single pdfium document. pdfium itself is not
//! thread-safe, and pdfium-render's `thread_safe` feature puts every call
//! behind one process-wide lock, so PDF files render one at a time even when
//! the aggregator converts them on separate blocking threads.
//!
//! A page that fails to render fails the whole file. Skipping it could hide
//! exactly the data the contract has to be checked against.

// Clippy pedantic allows:
// - Page indices fit comfortably in u32
#![allow(clippy::cast_possible_truncation)]

use anyhow::{Context, Result};
use cpcv_core::ContentFragment;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

/// Default upscale factor over native page size.
pub const DEFAULT_RENDER_SCALE: f32 = 2.0;

/// Default JPEG quality (0-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Rendering parameters for paginated documents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Scale factor applied to the native page size
    pub scale: f32,
    /// JPEG quality of the encoded page
    pub jpeg_quality: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_RENDER_SCALE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Callback receiving each rendered page (1-based number, bitmap).
pub type PageSink<'a> = dyn FnMut(u32, DynamicImage) -> Result<()> + 'a;

/// Turns PDF bytes into page bitmaps, in page order.
pub trait PageRasterizer: Send + Sync {
    /// Render every page of `pdf` at `scale`, handing each to `on_page`
    /// before the next one is rendered.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded, any page fails to
    /// render, or `on_page` fails.
    fn render_pages(&self, pdf: &[u8], scale: f32, on_page: &mut PageSink<'_>) -> Result<u32>;
}

/// [`PageRasterizer`] backed by the pdfium library.
///
/// The library is looked up in the working directory (or `library_dir` when
/// set) first, then on the system path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfiumRasterizer {
    library_dir: Option<String>,
}

impl PdfiumRasterizer {
    /// Rasterizer looking for pdfium in `dir` before the system path.
    #[must_use = "creates a rasterizer"]
    pub fn with_library_dir(dir: impl Into<String>) -> Self {
        Self {
            library_dir: Some(dir.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium> {
        let dir = self.library_dir.as_deref().unwrap_or("./");
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            .or_else(|_| Pdfium::bind_to_system_library())
            .context("Failed to bind pdfium library")?;
        Ok(Pdfium::new(bindings))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn render_pages(&self, pdf: &[u8], scale: f32, on_page: &mut PageSink<'_>) -> Result<u32> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .context("Failed to load PDF")?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let mut rendered = 0;

        for (i, page) in document.pages().iter().enumerate() {
            let page_num = (i + 1) as u32;
            let bitmap = page
                .render_with_config(&render_config)
                .with_context(|| format!("Failed to render page {page_num}"))?;
            on_page(page_num, bitmap.as_image())?;
            rendered = page_num;
        }

        Ok(rendered)
    }
}

/// JPEG-encode one page bitmap.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_jpeg(page: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // JPEG has no alpha channel
    let rgb = page.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&rgb)
        .context("Failed to encode JPEG")?;
    Ok(jpeg)
}

/// Render a PDF into one JPEG image fragment per page, in page order.
///
/// # Errors
///
/// Returns an error if the document is unreadable or any page fails.
pub fn pdf_to_fragments(
    pdf: &[u8],
    rasterizer: &dyn PageRasterizer,
    options: RenderOptions,
) -> Result<Vec<ContentFragment>> {
    let mut fragments = Vec::new();
    let pages = rasterizer.render_pages(pdf, options.scale, &mut |page_num, image| {
        let jpeg = encode_jpeg(&image, options.jpeg_quality)
            .with_context(|| format!("Failed to encode page {page_num}"))?;
        debug!(
            page = page_num,
            width = image.width(),
            height = image.height(),
            bytes = jpeg.len(),
            "Rendered PDF page"
        );
        fragments.push(ContentFragment::image("image/jpeg", &jpeg));
        Ok(())
    })?;

    debug_assert_eq!(pages as usize, fragments.len());
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert!((options.scale - 2.0).abs() < f32::EPSILON);
        assert_eq!(options.jpeg_quality, 80);
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let rgba =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 128])));
        let jpeg = encode_jpeg(&rgba, 80).unwrap();
        // SOI marker
        assert_eq!(&jpeg[..2], &[0xFF_u8, 0xD8]);

        let decoded =
            image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }

    #[test]
    fn test_encode_jpeg_rgb() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([255, 255, 255])));
        assert!(!encode_jpeg(&rgb, 50).unwrap().is_empty());
    }
}
