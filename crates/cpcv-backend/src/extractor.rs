//! Content Extractor: one uploaded file in, zero or more fragments out.
//!
//! | Kind | Output |
//! |------|--------|
//! | Image | one image fragment, payload untouched |
//! | PDF | one JPEG image fragment per page, in page order |
//! | DOCX / DOC | one text fragment prefixed with the file name |
//! | anything else | nothing |
//!
//! Unsupported files are skipped rather than rejected so a stray attachment
//! does not abort the run. Every other failure aborts it.

use crate::docx::word_text;
use crate::format::DocumentKind;
use crate::pdf::{pdf_to_fragments, PageRasterizer, PdfiumRasterizer, RenderOptions};
use cpcv_core::{ContentFragment, CpcvError, Result, UploadedFile};
use std::sync::Arc;
use tracing::{debug, warn};

/// Converts one file into model-consumable fragments.
///
/// Implementations are called from blocking worker threads, one call per
/// file, possibly several at once.
pub trait ContentExtractor: Send + Sync {
    /// Convert `file` into fragments.
    ///
    /// # Errors
    ///
    /// Returns [`CpcvError::Conversion`] if the file cannot be decoded.
    fn extract(&self, file: &UploadedFile) -> Result<Vec<ContentFragment>>;
}

/// Marker line placed before text extracted from a word-processing file.
#[must_use = "returns the text fragment header"]
pub fn text_header(file_name: &str) -> String {
    format!("[Conteúdo do Documento {file_name}]:")
}

/// The stock extractor for images, PDF, DOCX and DOC.
#[derive(Clone)]
pub struct DocumentExtractor {
    rasterizer: Arc<dyn PageRasterizer>,
    options: RenderOptions,
}

impl std::fmt::Debug for DocumentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentExtractor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor {
    /// Extractor rendering PDFs with pdfium at default options.
    #[must_use = "creates an extractor"]
    pub fn new() -> Self {
        Self::with_rasterizer(Arc::new(PdfiumRasterizer::default()))
    }

    /// Extractor rendering PDFs with the given rasterizer.
    #[must_use = "creates an extractor"]
    pub fn with_rasterizer(rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self {
            rasterizer,
            options: RenderOptions::default(),
        }
    }

    /// Override scale and JPEG quality.
    #[must_use = "returns the reconfigured extractor"]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Current render options.
    #[must_use = "returns the render options"]
    pub const fn options(&self) -> RenderOptions {
        self.options
    }

    fn image(file: &UploadedFile) -> Result<Vec<ContentFragment>> {
        if file.bytes().is_empty() {
            return Err(CpcvError::conversion(file.name(), "image payload is empty"));
        }
        Ok(vec![ContentFragment::image(file.media_type(), file.bytes())])
    }

    fn pdf(&self, file: &UploadedFile) -> Result<Vec<ContentFragment>> {
        pdf_to_fragments(file.bytes(), self.rasterizer.as_ref(), self.options)
            .map_err(|e| CpcvError::conversion(file.name(), format!("{e:#}")))
    }

    fn word(file: &UploadedFile) -> Result<Vec<ContentFragment>> {
        let text = word_text(file.bytes())
            .map_err(|e| CpcvError::conversion(file.name(), format!("{e:#}")))?;
        let header = text_header(file.name());
        Ok(vec![ContentFragment::text(
            format!("{header}\n{text}"),
            file.name(),
        )])
    }
}

impl ContentExtractor for DocumentExtractor {
    fn extract(&self, file: &UploadedFile) -> Result<Vec<ContentFragment>> {
        let kind = DocumentKind::detect(file.media_type(), file.name());
        debug!(file = file.name(), %kind, bytes = file.bytes().len(), "Extracting content");

        let fragments = match kind {
            DocumentKind::Image => Self::image(file)?,
            DocumentKind::Pdf => self.pdf(file)?,
            DocumentKind::Docx | DocumentKind::Doc => Self::word(file)?,
            DocumentKind::Unsupported => {
                warn!(
                    file = file.name(),
                    media_type = file.media_type(),
                    "Skipping file with unsupported type"
                );
                Vec::new()
            }
        };

        debug!(file = file.name(), fragments = fragments.len(), "Extracted content");
        Ok(fragments)
    }
}
