//! Document kind detection from declared media type and file name.

/// MIME type of Office Open XML word-processing documents.
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// MIME type of Word 97-2003 binary documents.
pub const DOC_MIME: &str = "application/msword";

/// MIME type of PDF documents.
pub const PDF_MIME: &str = "application/pdf";

/// How a file is turned into fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Raster image, passed through as-is
    Image,
    /// Paginated document, rasterized page by page
    Pdf,
    /// Office Open XML word-processing document, text extracted
    Docx,
    /// Word 97-2003 binary document, text extracted
    Doc,
    /// Anything else, silently skipped
    Unsupported,
}

impl DocumentKind {
    /// Detect the kind of a file.
    ///
    /// The declared media type wins; the extension (case-insensitive) is
    /// only consulted for word-processing formats, whose media type is often
    /// missing or generic.
    #[must_use = "returns the detected document kind"]
    pub fn detect(media_type: &str, file_name: &str) -> Self {
        let media_type = media_type.trim().to_ascii_lowercase();
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        if media_type.starts_with("image/") {
            Self::Image
        } else if media_type == PDF_MIME {
            Self::Pdf
        } else if media_type == DOCX_MIME || extension.as_deref() == Some("docx") {
            Self::Docx
        } else if media_type == DOC_MIME || extension.as_deref() == Some("doc") {
            Self::Doc
        } else {
            Self::Unsupported
        }
    }

    /// True for the two word-processing kinds.
    #[inline]
    #[must_use = "returns whether the kind carries flow text"]
    pub const fn is_word_processing(self) -> bool {
        matches!(self, Self::Docx | Self::Doc)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
            Self::Doc => write!(f, "doc"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}
