//! # cpcv-backend
//!
//! Turns uploaded files into [`ContentFragment`](cpcv_core::ContentFragment)s
//! and assembles them into the payload the reasoning model reads.
//!
//! ## Supported formats
//!
//! | Format | Backend | Output |
//! |--------|---------|--------|
//! | Images (`image/*`) | pass-through | one image fragment |
//! | PDF | pdfium (`pdfium-render`) | one JPEG per page |
//! | DOCX | `zip` + `quick-xml` | one text fragment |
//! | DOC (Word 97-2003) | `LibreOffice` to DOCX | one text fragment |
//!
//! Anything else is skipped with a warning.
//!
//! ## Example
//!
//! ```no_run
//! use cpcv_backend::{DocumentExtractor, EvidenceAggregator};
//! use cpcv_core::{Category, UploadSet, UploadedFile};
//! use std::sync::Arc;
//!
//! # async fn run() -> cpcv_core::Result<()> {
//! let mut files = UploadSet::new();
//! files.add(UploadedFile::new(
//!     Category::Contract,
//!     "cpcv.pdf",
//!     "application/pdf",
//!     std::fs::read("cpcv.pdf")?,
//! ));
//!
//! let aggregator = EvidenceAggregator::new(Arc::new(DocumentExtractor::new()));
//! let payload = aggregator.aggregate(&files).await?.into_payload();
//! println!("{} fragments", payload.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod doc;
pub mod docx;
pub mod extractor;
pub mod format;
pub mod pdf;

pub use aggregator::{Evidence, EvidenceAggregator};
pub use extractor::{text_header, ContentExtractor, DocumentExtractor};
pub use format::DocumentKind;
pub use pdf::{PageRasterizer, PdfiumRasterizer, RenderOptions};
